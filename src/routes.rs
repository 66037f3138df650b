use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Multipart, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    error::AppError,
    mail::MailMessage,
    models::{Blog, Comment, NewUser, PublicUser, User, UserUpdate},
    state::AppState,
    store::{Collection, next_id},
    upload,
};

/// JSON body, with extraction failures mapped onto the JSON error contract.
type Body = Result<Json<Value>, JsonRejection>;

/// Path identifier, with non-integer segments mapped the same way.
type PathId = Result<Path<u64>, PathRejection>;

pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = body?;
    let new_user = NewUser::from_input(input)?;

    let created = state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            if users.iter().any(|u| u.username == new_user.username) {
                return Err(AppError::DuplicateUsername);
            }

            let user = new_user.into_user(next_id(users));
            users.push(user.clone());
            Ok(user)
        })
        .await?;

    state.mailer.dispatch(MailMessage {
        to: created.email.clone(),
        subject: "Welcome to Quill".to_string(),
        text: format!("Hi {}, your account has been created.", created.username),
    });

    info!("Registered user {} (id {})", created.username, created.id);

    Ok((StatusCode::CREATED, Json(PublicUser::from(&created))))
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Json<PublicUser>, AppError> {
    let Json(input) = body?;
    let credentials: Credentials =
        serde_json::from_value(input).map_err(|e| AppError::Validation(e.to_string()))?;

    let users: Vec<User> = state.store.load(Collection::Users).await?;
    let user = users
        .iter()
        .find(|u| u.username == credentials.username && u.password == credentials.password)
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Json(PublicUser::from(user)))
}

pub async fn list_blogs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Blog>>, AppError> {
    let blogs: Vec<Blog> = state.store.load(Collection::Blogs).await?;
    Ok(Json(blogs))
}

pub async fn get_blog(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> Result<Json<Blog>, AppError> {
    let Path(id) = id?;

    let blogs: Vec<Blog> = state.store.load(Collection::Blogs).await?;
    blogs
        .into_iter()
        .find(|b| b.id == id)
        .map(Json)
        .ok_or(AppError::BlogNotFound)
}

pub async fn get_writer(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> Result<Json<PublicUser>, AppError> {
    let Path(id) = id?;

    let users: Vec<User> = state.store.load(Collection::Users).await?;
    users
        .iter()
        .find(|u| u.id == id)
        .map(|u| Json(PublicUser::from(u)))
        .ok_or(AppError::UserNotFound)
}

pub async fn create_blog(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = body?;

    let created = state
        .store
        .update(Collection::Blogs, |blogs: &mut Vec<Blog>| {
            let blog = Blog::from_input(input, next_id(blogs))?;
            blogs.push(blog.clone());
            Ok::<_, AppError>(blog)
        })
        .await?;

    info!("Created blog {}", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn blog_comments(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> Result<Json<Vec<Comment>>, AppError> {
    let Path(id) = id?;

    let comments: Vec<Comment> = state.store.load(Collection::Comments).await?;
    let matching = comments.into_iter().filter(|c| c.blog_id == id).collect();
    Ok(Json(matching))
}

pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = body?;

    let created = state
        .store
        .update(Collection::Comments, |comments: &mut Vec<Comment>| {
            let comment = Comment::from_input(input, next_id(comments))?;
            comments.push(comment.clone());
            Ok::<_, AppError>(comment)
        })
        .await?;

    info!("Created comment {} on blog {}", created.id, created.blog_id);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    id: PathId,
    mut multipart: Multipart,
) -> Result<Json<PublicUser>, AppError> {
    let Path(id) = id?;

    let mut fields = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(original) => {
                // only the two recognized file fields are stored
                if name != "avatar" && name != "cv" {
                    continue;
                }

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                let path = upload::store_file(&state.config.uploads_dir, &original, data).await?;
                fields.insert(name, Value::String(path));
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;

                if name == "address" {
                    let address: Value = serde_json::from_str(&text)
                        .map_err(|e| AppError::Validation(format!("address must be JSON: {e}")))?;
                    fields.insert(name, address);
                } else {
                    fields.insert(name, Value::String(text));
                }
            }
        }
    }

    let update = UserUpdate::from_input(Value::Object(fields))?;

    let updated = state
        .store
        .update(Collection::Users, |users: &mut Vec<User>| {
            let user = users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(AppError::UserNotFound)?;
            update.apply(user);
            Ok::<_, AppError>(user.clone())
        })
        .await?;

    info!("Updated user {}", updated.id);

    Ok(Json(PublicUser::from(&updated)))
}

// TODO: real reset flow (token generation + mail) once the frontend has a
// reset screen to land on.
pub async fn forgot_password() -> AppError {
    AppError::NotImplemented
}
