/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, token refresh and the current user
/// - `users`: User management (list, create, show, update, status, avatar, delete)
/// - `store`: Store settings, image, GST numbers and social media links
/// - `multipart`: Multipart form reader shared by the upload endpoints

pub mod auth;
pub mod health;
pub mod multipart;
pub mod store;
pub mod users;
