// handlers/protected/mod.rs - Handlers behind the session middleware
//
// Every request here carries a verified identity token and a resolved
// profile (`Extension<Session>`). `session` and `dashboard` are open to
// pending users; the rest sit behind the assigned-role check.
pub mod cases;
pub mod chat;
pub mod companies;
pub mod dashboard;
pub mod session;
pub mod tasks;
