use axum::response::Html;
use once_cell::sync::Lazy;
use tera::{Context, Tera};

use crate::db::users::User;
use crate::session::{Flash, Session};

pub static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("home.html", include_str!("../templates/home.html")),
        ("home_anon.html", include_str!("../templates/home_anon.html")),
        ("signup.html", include_str!("../templates/signup.html")),
        ("login.html", include_str!("../templates/login.html")),
        ("404.html", include_str!("../templates/404.html")),
        ("users/index.html", include_str!("../templates/users/index.html")),
        ("users/show.html", include_str!("../templates/users/show.html")),
        (
            "users/following.html",
            include_str!("../templates/users/following.html"),
        ),
        (
            "users/followers.html",
            include_str!("../templates/users/followers.html"),
        ),
        ("users/likes.html", include_str!("../templates/users/likes.html")),
        ("users/edit.html", include_str!("../templates/users/edit.html")),
        (
            "messages/new.html",
            include_str!("../templates/messages/new.html"),
        ),
        (
            "messages/show.html",
            include_str!("../templates/messages/show.html"),
        ),
    ])
    .expect("embedded templates parse");
    tera
});

/// Renders a page with the nav user and any pending flash notices. Flashes
/// are drained here, so a flash set earlier in the same request shows up in
/// this response.
pub fn render(
    name: &str,
    session: &Session,
    current_user: Option<&User>,
    mut ctx: Context,
) -> Result<Html<String>, tera::Error> {
    ctx.insert("current_user", &current_user);
    ctx.insert("flashes", &session.take_flashes());
    Ok(Html(TEMPLATES.render(name, &ctx)?))
}

/// Render without a session, for error paths that have none at hand.
pub fn render_bare(name: &str) -> Result<String, tera::Error> {
    let mut ctx = Context::new();
    ctx.insert("current_user", &Option::<User>::None);
    ctx.insert("flashes", &Vec::<Flash>::new());
    TEMPLATES.render(name, &ctx)
}
