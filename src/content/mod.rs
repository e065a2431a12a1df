mod cell;
mod media;
mod post;

pub use self::{
    media::{MEDIA_HEADER, MediaLogEntry, MediaPayload},
    post::{
        POST_COLUMNS, POST_HEADER, Post, PostPayload, SLUG_COLUMN, SlugPayload, now_timestamp,
        slugify,
    },
};
