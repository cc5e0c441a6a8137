mod auth;
mod request;
mod submission;
