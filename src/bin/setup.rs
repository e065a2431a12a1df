use sheetcms::storage::{self, PgWorkbook};

#[tokio::main]
async fn main() {
    sheetcms::init_tracing();

    let Some(url) = std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()) else {
        eprintln!("DATABASE_URL not set");
        std::process::exit(1);
    };

    let result = async {
        let pool = storage::new_db_pool(&url).await?;
        storage::migrate(&pool, storage::SCHEMA).await?;
        storage::setup(&PgWorkbook::new(pool)).await
    }
    .await;

    match result {
        Ok(()) => println!("✅ Sheets ready"),
        Err(e) => {
            eprintln!("❌ Setup failed: {e}");
            std::process::exit(1);
        }
    }
}
