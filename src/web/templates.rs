//! Server-rendered pages for the form interface.

use crate::users::repo_types::User;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, sans-serif;
            max-width: 720px;
            margin: 40px auto;
            padding: 0 20px;
        }}
        label {{
            display: block;
            margin-top: 10px;
        }}
        input {{
            width: 100%;
            padding: 6px;
            box-sizing: border-box;
        }}
        table {{
            border-collapse: collapse;
            width: 100%;
        }}
        td, th {{
            border: 1px solid #ddd;
            padding: 6px;
            text-align: left;
        }}
        nav a {{
            margin-right: 12px;
        }}
    </style>
</head>
<body>
    <nav>
        <a href="/">Add user</a>
        <a href="/get-data">Find user</a>
        <a href="/users">All users</a>
    </nav>
    <h1>{title}</h1>
{body}
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn user_table(user: &User) -> String {
    format!(
        r#"    <table>
        <tr><th>ID</th><td>{id}</td></tr>
        <tr><th>Name</th><td>{name}</td></tr>
        <tr><th>Email</th><td>{email}</td></tr>
        <tr><th>Address</th><td>{address}</td></tr>
        <tr><th>Phone number</th><td>{phonenumber}</td></tr>
    </table>
    <p><a href="/delete/{id}">Delete this user</a></p>"#,
        id = user.id,
        name = html_escape(&user.name),
        email = html_escape(&user.email),
        address = html_escape(&user.address),
        phonenumber = html_escape(&user.phonenumber),
    )
}

pub fn index_page() -> String {
    layout(
        "Add user",
        r#"    <form method="POST" action="/submit">
        <label>Name <input type="text" name="name" required /></label>
        <label>Email <input type="email" name="email" required /></label>
        <label>Address <input type="text" name="address" required /></label>
        <label>Phone number <input type="tel" name="phonenumber" required /></label>
        <label>Password <input type="password" name="password" required /></label>
        <p><button type="submit">Submit</button></p>
    </form>"#,
    )
}

pub fn submitted_page(user: Option<&User>) -> String {
    let body = match user {
        Some(user) => user_table(user),
        None => "    <p>No data found.</p>".to_string(),
    };
    layout("Submitted data", &body)
}

pub fn lookup_page() -> String {
    layout(
        "Find user",
        r#"    <form method="POST" action="/get-data">
        <label>User ID <input type="text" name="input_id" required /></label>
        <p><button type="submit">Look up</button></p>
    </form>"#,
    )
}

pub fn data_page(input_id: &str, user: Option<&User>) -> String {
    let body = match user {
        Some(user) => user_table(user),
        None => format!(
            "    <p>No user found with ID {}.</p>",
            html_escape(input_id)
        ),
    };
    layout("User data", &body)
}

/// The list itself is fetched client-side from `/api/users`.
pub fn users_page() -> String {
    layout(
        "All users",
        r##"    <table id="users">
        <thead>
            <tr><th>ID</th><th>Name</th><th>Email</th><th>Address</th><th>Phone number</th><th></th></tr>
        </thead>
        <tbody></tbody>
    </table>
    <p id="status">Loading...</p>
    <script>
        function cell(text) {
            const td = document.createElement("td");
            td.textContent = text;
            return td;
        }
        fetch("/api/users")
            .then((res) => res.json())
            .then((data) => {
                const body = document.querySelector("#users tbody");
                for (const u of data.users) {
                    const tr = document.createElement("tr");
                    for (const v of [u.id, u.name, u.email, u.address, u.phonenumber]) {
                        tr.appendChild(cell(v));
                    }
                    const del = document.createElement("td");
                    const link = document.createElement("a");
                    link.href = "/delete/" + u.id;
                    link.textContent = "Delete";
                    del.appendChild(link);
                    tr.appendChild(del);
                    body.appendChild(tr);
                }
                document.getElementById("status").textContent =
                    data.users.length === 0 ? "No users yet." : "";
            })
            .catch((err) => {
                document.getElementById("status").textContent = "Failed to load users: " + err;
            });
    </script>"##,
    )
}

pub fn delete_page(id: i64) -> String {
    layout(
        "Delete user",
        &format!(
            r#"    <p>Delete user {id}? This cannot be undone.</p>
    <form method="POST" action="/delete/{id}">
        <button type="submit">Delete</button>
        <a href="/users">Cancel</a>
    </form>"#
        ),
    )
}
