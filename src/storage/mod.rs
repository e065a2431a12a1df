mod memory;
mod postgres;
mod posts;
mod setup;
mod workbook;

pub use self::{
    memory::MemoryWorkbook,
    postgres::{Db, PgWorkbook, SCHEMA, migrate, new_db_pool},
    posts::PostSheet,
    setup::setup,
    workbook::{CONFIG_SHEET, MEDIA_SHEET, POSTS_SHEET, Workbook},
};
