mod console;
mod http;
mod settings;
mod upload;

pub use self::{
    console::{ConnectionState, Console, NoticeKind, Notification},
    http::{CmsClient, NOT_CONFIGURED, http_client},
    settings::{API_URL_KEY, FileSettings, MemorySettings, PUBLIC_KEY_KEY, SettingsStore},
    upload::{IMAGEKIT_UPLOAD_URL, ImageFile, ImageUploader},
};
