use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::{Deserialize, Serialize};
use tera::Context;
use validator::Validate;

use crate::auth::{CurrentUser, CURR_USER_KEY};
use crate::db::users::{self, NewUser};
use crate::error::AppResult;
use crate::session::Session;
use crate::views::{redirect, validation_messages};
use crate::{templates, AppState};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, max = 30, message = "Username can't be blank"))]
    pub username: String,

    #[validate(
        length(min = 1, message = "E-mail can't be blank"),
        email(message = "Invalid e-mail address")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username can't be blank"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password can't be blank"))]
    pub password: String,
}

fn render_signup(session: &Session, form: &SignupForm, errors: &[String]) -> AppResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(templates::render("signup.html", session, None, ctx)?.into_response())
}

fn render_login(session: &Session, form: &LoginForm, errors: &[String]) -> AppResult<Response> {
    let mut ctx = Context::new();
    ctx.insert("form", form);
    ctx.insert("errors", errors);
    Ok(templates::render("login.html", session, None, ctx)?.into_response())
}

// GET /signup
pub async fn signup_form(session: Session, CurrentUser(current): CurrentUser) -> AppResult<Response> {
    if current.is_some() {
        return Ok(redirect("/"));
    }
    render_signup(&session, &SignupForm::default(), &[])
}

// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return render_signup(&session, &form, &validation_messages(&errors));
    }

    let image_url = (!form.image_url.is_empty()).then(|| form.image_url.clone());
    let new_user = NewUser::signup(&form.username, &form.email, &form.password, image_url)?;

    let user = match users::insert(&state.pool, &new_user).await {
        Ok(user) => user,
        Err(err) if err.is_unique_violation() => {
            session.flash("danger", "Username already taken");
            return render_signup(&session, &form, &[]);
        }
        Err(err) => return Err(err.into()),
    };

    session.insert(CURR_USER_KEY, user.id)?;
    Ok(redirect("/"))
}

// GET /login
pub async fn login_form(session: Session, CurrentUser(current): CurrentUser) -> AppResult<Response> {
    if current.is_some() {
        return Ok(redirect("/"));
    }
    render_login(&session, &LoginForm::default(), &[])
}

// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return render_login(&session, &form, &validation_messages(&errors));
    }

    match users::authenticate(&state.pool, &form.username, &form.password).await? {
        Some(user) => {
            session.insert(CURR_USER_KEY, user.id)?;
            session.flash("success", format!("Hello, {}!", user.username));
            Ok(redirect("/"))
        }
        None => {
            session.flash("danger", "Invalid credentials.");
            render_login(&session, &form, &[])
        }
    }
}

// GET /logout
pub async fn logout(session: Session) -> Response {
    session.remove(CURR_USER_KEY);
    session.flash("success", "You have successfully logged out.");
    redirect("/login")
}
