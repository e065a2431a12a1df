use sheetcms::{
    client::{ConnectionState, Console, FileSettings, ImageFile, http_client},
    content::Post,
    error::{Error, Result},
};

fn print_usage_and_exit() -> ! {
    eprintln!(
        "Usage:
  console list
  console get <slug>
  console create <title> [slug] [field=value ...]
  console edit <slug> [field=value ...]
  console delete <slug>
  console upload <slug> <file>
  console status
  console settings <api_url> [public_key]"
    );
    std::process::exit(1);
}

/// 按字段名修改文章
fn set_field(post: &mut Post, assignment: &str) -> Result<()> {
    let Some((name, value)) = assignment.split_once('=') else {
        return Err(Error::Validation("expected field=value"));
    };
    let value = value.to_string();

    match name {
        "title" => post.title = value,
        "label" => post.label = value,
        "image" => post.image = value,
        "content" => post.content = value,
        "slug" => post.slug = value,
        "description" => post.description = value,
        "status" => post.status = value,
        "date" => post.date = value,
        "type" => post.kind = value,
        _ => return Err(Error::Validation("unknown field")),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("❌ {e}"),
    }
}

async fn execute(
    console: &mut Console<FileSettings>,
    command: &str,
    args: &[String],
) -> Result<()> {
    match (command, args) {
        ("list", []) => {
            console.fetch_posts().await?;
            print_json(&console.posts());
        }

        ("get", [slug]) => {
            console.fetch_posts().await?;
            print_json(&console.begin_edit(slug)?);
        }

        ("create", [title, rest @ ..]) => {
            let mut post = console.begin_create_titled(title);
            // slug 省略时由标题生成
            let fields = match rest {
                [slug, fields @ ..] if !slug.contains('=') => {
                    post.slug = slug.clone();
                    fields
                }
                fields => fields,
            };
            for field in fields {
                set_field(&mut post, field)?;
            }
            console.save_post(&post).await?;
        }

        ("edit", [slug, fields @ ..]) => {
            console.fetch_posts().await?;
            let mut post = console.begin_edit(slug)?;
            for field in fields {
                set_field(&mut post, field)?;
            }
            console.save_post(&post).await?;
        }

        ("delete", [slug]) => console.delete_post(slug).await?,

        ("upload", [slug, file]) => {
            console.fetch_posts().await?;
            let mut post = console.begin_edit(slug)?;

            let bytes = std::fs::read(file)?;
            let name = std::path::Path::new(file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());

            let url = console
                .upload_image(&mut post, ImageFile { name, bytes })
                .await?;
            println!("{url}");
            console.save_post(&post).await?;
        }

        ("status", []) => print_json(&console.system_status().await?),

        ("settings", [api_url]) => console.save_settings(api_url, None)?,
        ("settings", [api_url, public_key]) => {
            console.save_settings(api_url, Some(public_key.as_str()))?
        }

        _ => print_usage_and_exit(),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    sheetcms::init_tracing();

    let mut args = std::env::args().skip(1); // 跳过程序名
    let command = args.next().unwrap_or_else(|| print_usage_and_exit());
    let rest: Vec<String> = args.collect();

    let console = FileSettings::open_default()
        .and_then(|settings| Ok(Console::new(settings, http_client()?)));
    let mut console = match console {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if command != "settings" && console.connection() == ConnectionState::Demo {
        eprintln!("ℹ️ Demo Mode. Connect API with `console settings <api_url>`.");
    }

    let result = execute(&mut console, &command, &rest).await;

    if let Some(notice) = console.notification() {
        println!("{}", notice.message);
    }
    if let Err(e) = result {
        if console.notification().is_none() {
            eprintln!("❌ {e}");
        }
        std::process::exit(1);
    }
}
