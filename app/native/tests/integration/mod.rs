mod spaces_engine;
mod spaces_notifications;
