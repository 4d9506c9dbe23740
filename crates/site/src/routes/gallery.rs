//! Gallery view, photo uploads and admin photo deletion.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use forever_core::layout::{FormPresentation, SmallScreenForm};
use forever_core::{DocumentId, Gallery, Photo, PhotoUpload, RecordError};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::{Chrome, Page, Sidebar, SlideLabel, add_href, href};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, Viewer, fresh_user};
use crate::models::session_keys;
use crate::services::feeds::{gallery_view, photo_feed};
use crate::services::submissions::{SubmitError, delete_selected_photo, upload_photo};
use crate::state::AppState;

const FORM_ANCHOR: &str = "photo-form";

/// Value of `error` after a rejected file.
const NOT_AN_IMAGE: &str = "image";

/// Local view state carried in the URL.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    /// Id of the selected photo.
    pub selected: Option<String>,
    /// Present when the fullscreen upload form was requested.
    pub compose: Option<String>,
    pub error: Option<String>,
}

/// Delete form data.
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    pub selected: Option<String>,
}

/// A photo tile.
pub struct PhotoTile {
    pub id: String,
    pub image_url: String,
    pub description: Option<String>,
    pub selected: bool,
    pub select_href: String,
}

/// Gallery page template.
#[derive(Template, WebTemplate)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate {
    pub chrome: Chrome,
    pub is_admin: bool,
    /// Empty for both an empty and a failed listing; either shows the
    /// loading line.
    pub photos: Vec<PhotoTile>,
    pub selected: Option<String>,
    pub add_href: String,
    pub form: FormPresentation,
    pub error: Option<&'static str>,
    pub show_add_action: bool,
    pub sidebar: Sidebar,
}

/// Display the gallery with its selection.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    page: Page,
    Query(query): Query<GalleryQuery>,
) -> Result<impl IntoResponse> {
    let uploaded = page
        .session
        .remove::<Photo>(session_keys::UPLOADED_PHOTO)
        .await?;
    let feed = gallery_view(state.firestore(), uploaded).await;
    let layout = page.layout;
    let is_admin = page.viewer.is_admin;

    let sidebar = Sidebar::new(
        &state,
        feed.ready().map(Gallery::photos),
        SlideLabel::Slideshow,
    );

    let mut gallery = feed.ready().cloned().unwrap_or_default();
    gallery.select(query.selected.map(DocumentId::new).as_ref());

    let photos = gallery
        .photos()
        .iter()
        .map(|photo| PhotoTile {
            id: photo.id.as_str().to_string(),
            image_url: photo.image_url.clone(),
            description: photo.description.clone(),
            selected: gallery.is_selected(&photo.id),
            select_href: href("/gallery", &[("selected", photo.id.as_str())], None),
        })
        .collect();

    let error = (query.error.as_deref() == Some(NOT_AN_IMAGE))
        .then_some("Please select an image file.");

    Ok(GalleryTemplate {
        chrome: page.chrome("gallery"),
        is_admin,
        photos,
        selected: gallery.selected().map(|p| p.id.as_str().to_string()),
        add_href: add_href(&layout, "/gallery", FORM_ANCHOR),
        form: layout.form_presentation(
            query.compose.is_some() || error.is_some(),
            SmallScreenForm::OverlayOnly,
        ),
        error,
        show_add_action: layout.show_add_action(is_admin),
        sidebar,
    })
}

/// Read the upload form. Missing parts become empty values for validation.
async fn read_upload(mut multipart: Multipart) -> Result<(PhotoUpload, bool)> {
    let mut upload = PhotoUpload {
        file_name: String::new(),
        content_type: String::new(),
        bytes: Vec::new(),
        description: None,
    };
    let mut compose = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                upload.file_name = field.file_name().unwrap_or_default().to_string();
                upload.content_type = field.content_type().unwrap_or_default().to_string();
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();
            }
            Some("description") => {
                upload.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("compose") => compose = true,
            _ => {}
        }
    }

    Ok((upload, compose))
}

/// Handle a photo upload. The new photo leads the next gallery view.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    viewer: Viewer,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let (upload, compose) = read_upload(multipart).await?;
    let compose = if compose { "1" } else { "" };
    let user = viewer.writer(&state, &session).await?;

    match upload_photo(
        state.firestore(),
        state.storage(),
        user.as_ref().map(|u| u.id_token.as_str()),
        upload,
    )
    .await
    {
        Ok(photo) => {
            state.slideshow().invalidate().await;
            add_breadcrumb("gallery", "Added photo", Some(&[("photo_id", photo.id.as_str())]));
            session.insert(session_keys::UPLOADED_PHOTO, &photo).await?;
            Ok(Redirect::to("/gallery").into_response())
        }
        Err(SubmitError::Invalid(RecordError::NotAnImage)) => Ok(Redirect::to(&href(
            "/gallery",
            &[("compose", compose), ("error", NOT_AN_IMAGE)],
            Some(FORM_ANCHOR),
        ))
        .into_response()),
        Err(e) => super::submit_failed(
            e,
            &href("/gallery", &[("compose", compose)], Some(FORM_ANCHOR)),
        ),
    }
}

/// Delete the selected photo (admins only).
#[instrument(skip_all)]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<DeleteForm>,
) -> Result<Response> {
    let user = fresh_user(&state, &session, user).await?;
    let is_admin = state
        .roles()
        .is_admin(state.firestore(), &user.uid, Some(&user.id_token))
        .await;
    let selected = form.selected.filter(|id| !id.is_empty());
    let back = href(
        "/gallery",
        &[("selected", selected.as_deref().unwrap_or_default())],
        None,
    );

    let Some(photos) = photo_feed(state.firestore()).await.ready().cloned() else {
        return Ok(Redirect::to(&back).into_response());
    };
    let mut gallery = Gallery::new(photos);
    gallery.select(selected.map(DocumentId::new).as_ref());

    match delete_selected_photo(
        state.firestore(),
        state.storage(),
        is_admin,
        Some(&user.id_token),
        &mut gallery,
    )
    .await
    {
        Ok(Some(photo)) => {
            state.slideshow().invalidate().await;
            add_breadcrumb("gallery", "Deleted photo", Some(&[("photo_id", photo.id.as_str())]));
            Ok(Redirect::to("/gallery").into_response())
        }
        Ok(None) => Ok(Redirect::to("/gallery").into_response()),
        Err(e) => super::submit_failed(e, &back),
    }
}
