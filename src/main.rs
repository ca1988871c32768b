use newsdesk::error::Result;
use newsdesk::feed::format_pub_date;
use newsdesk::sanitize::clear_int_str;
use newsdesk::{AppError, ArticleForm, ArticleStore, ArticleView, Config, FeedStatus, Mutation};

const USAGE: &str = "Usage:
  newsdesk add <title> <category-id> <description> <text> <source>
  newsdesk list [--json]
  newsdesk show <id>
  newsdesk delete <id>
  newsdesk categories
  newsdesk rss";

fn main() {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Err(e) = run(&args) {
        // A store that failed to initialize is unusable: report the raw cause.
        if e.is_init() {
            eprintln!("{}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = Config::load()?;
    let store = ArticleStore::open(&config)?;

    match (command.as_str(), &args[1..]) {
        ("add", [title, category, description, text, source]) => {
            let form = ArticleForm {
                title: title.clone(),
                category: category.clone(),
                description: description.clone(),
                text: text.clone(),
                source: source.clone(),
            };
            let mutation = form.submit(&store)?;
            println!("Added article {}", mutation.id);
            report_feed(&mutation);
        }
        ("list", rest) => {
            let articles = store.list_articles()?;
            if rest.iter().any(|arg| arg == "--json") {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                for article in &articles {
                    print_summary(article);
                }
            }
        }
        ("show", [id]) => match store.get_article(clear_int_str(id))? {
            Some(article) => {
                print_summary(&article);
                println!("{}", article.text);
                println!("Source: {}", article.source);
            }
            None => println!("Article not found"),
        },
        ("delete", [id]) => {
            let mutation = store.delete_article(clear_int_str(id))?;
            println!("Deleted {} article(s)", mutation.rows_affected);
            report_feed(&mutation);
        }
        ("categories", []) => {
            for category in store.list_categories()? {
                println!("{:>3}  {}", category.id, category.name);
            }
        }
        ("rss", []) => {
            let count = store.regenerate_feed()?;
            println!("Wrote {} items to {:?}", count, store.feed().path());
        }
        _ => {
            return Err(AppError::Validation(format!(
                "Unrecognized command line\n{}",
                USAGE
            )))
        }
    }

    store.close()
}

fn print_summary(article: &ArticleView) {
    println!(
        "[{}] {} ({}, {})\n    {}",
        article.id,
        article.title,
        article.category,
        format_pub_date(article.datetime),
        article.description
    );
}

fn report_feed(mutation: &Mutation) {
    if let FeedStatus::Stale(reason) = &mutation.feed {
        eprintln!("Warning: feed was not updated: {}", reason);
    }
}
