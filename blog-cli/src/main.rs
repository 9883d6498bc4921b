use anyhow::{Context, Result};
use blog_client::{
    BlogClient, CreateCategoryRequest, CreatePostRequest, ListPostsQuery, PostResponse,
    UpdateCategoryRequest, UpdatePostRequest,
};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Server base URL; falls back to BLOG_SERVER_URL
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List posts with optional filters
    List {
        #[arg(short, long)]
        page: Option<i64>,

        #[arg(short, long)]
        limit: Option<i64>,

        /// Filter by category id
        #[arg(short, long)]
        category: Option<i64>,

        /// Case-insensitive search over title and content
        #[arg(long)]
        search: Option<String>,
    },

    Get {
        #[arg(short, long)]
        id: i64,
    },

    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        #[arg(short, long)]
        excerpt: Option<String>,

        #[arg(long)]
        category: Option<i64>,

        /// Comma-separated list of tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },

    Update {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short, long)]
        excerpt: Option<String>,

        #[arg(long)]
        category: Option<i64>,

        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },

    Delete {
        #[arg(short, long)]
        id: i64,
    },

    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommands),

    /// Check server health
    Health,
}

#[derive(Subcommand)]
enum CategoryCommands {
    List,

    Create {
        #[arg(short, long)]
        name: String,

        /// Hex color, e.g. #6B7280
        #[arg(short, long)]
        color: Option<String>,
    },

    Update {
        #[arg(short, long)]
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        color: Option<String>,
    },

    Delete {
        #[arg(short, long)]
        id: i64,
    },
}

fn parse_tags(tags: &Option<String>) -> Option<Vec<String>> {
    tags.as_ref().map(|raw| {
        raw.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
}

fn print_post(post: &PostResponse) {
    println!("   ID: {}", post.id);
    println!("   Title: {}", post.title.bold());
    println!("   Slug: {}", post.slug);
    if let Some(category) = &post.category {
        println!("   Category: {} ({})", category.name, category.color);
    }
    if !post.tags.is_empty() {
        println!("   Tags: {}", post.tags.join(", "));
    }
    println!("   Excerpt: {}", post.excerpt);
    println!("   Created: {}", post.created_at);
    println!("   Updated: {}", post.updated_at);
}

fn fail(message: String) -> ! {
    println!("{} {}", "✗".red(), message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let server = cli
        .server
        .or_else(|| std::env::var("BLOG_SERVER_URL").ok())
        .unwrap_or_else(|| "http://localhost:5000".to_string());

    println!("🔌 Connecting to: {}", server);

    let client = BlogClient::new(server);

    match &cli.command {
        Commands::List {
            page,
            limit,
            category,
            search,
        } => {
            let query = ListPostsQuery {
                page: *page,
                limit: *limit,
                category: *category,
                search: search.clone(),
            };

            match client.list_posts(query).await {
                Ok(response) => {
                    println!(
                        "{} Page {}/{} ({} posts total)",
                        "✓".green(),
                        response.pagination.current_page,
                        response.pagination.total_pages,
                        response.pagination.total_posts
                    );
                    println!();

                    if response.posts.is_empty() {
                        println!("   No posts found");
                    } else {
                        for post in &response.posts {
                            println!("   [{}] {}", post.id, post.title.bold());
                            if let Some(category) = &post.category {
                                println!("       Category: {}", category.name);
                            }
                            println!("       {}", post.excerpt);
                            println!();
                        }
                    }
                }
                Err(e) => fail(format!("Failed to list posts: {}", e)),
            }
        }

        Commands::Get { id } => match client.get_post(*id).await {
            Ok(post) => {
                println!("{} Post retrieved:", "✓".green());
                print_post(&post);
                println!("   Content: {}", post.content);
            }
            Err(e) if e.is_not_found() => fail(format!("Post #{} not found", id)),
            Err(e) => fail(format!("Error: {}", e)),
        },

        Commands::Create {
            title,
            content,
            excerpt,
            category,
            tags,
            image,
        } => {
            let req = CreatePostRequest {
                title: title.clone(),
                content: content.clone(),
                excerpt: excerpt.clone(),
                category_id: *category,
                tags: parse_tags(tags),
                featured_image: image.clone(),
            };

            match client.create_post(req).await {
                Ok(post) => {
                    println!("{} Post created!", "✓".green());
                    print_post(&post);
                }
                Err(e) => fail(format!("Failed to create post: {}", e)),
            }
        }

        Commands::Update {
            id,
            title,
            content,
            excerpt,
            category,
            tags,
            image,
        } => {
            let req = UpdatePostRequest {
                title: title.clone(),
                content: content.clone(),
                excerpt: excerpt.clone(),
                category_id: *category,
                tags: parse_tags(tags),
                featured_image: image.clone(),
            };

            match client.update_post(*id, req).await {
                Ok(post) => {
                    println!("{} Post updated!", "✓".green());
                    print_post(&post);
                }
                Err(e) if e.is_not_found() => fail(format!("Post #{} not found", id)),
                Err(e) => fail(format!("Failed to update post: {}", e)),
            }
        }

        Commands::Delete { id } => match client.delete_post(*id).await {
            Ok(response) => println!("{} {}", "✓".green(), response.message),
            Err(e) if e.is_not_found() => fail(format!("Post #{} not found", id)),
            Err(e) => fail(format!("Failed to delete post: {}", e)),
        },

        Commands::Categories(command) => match command {
            CategoryCommands::List => match client.list_categories().await {
                Ok(categories) => {
                    println!("{} {} categories", "✓".green(), categories.len());
                    for category in categories {
                        println!(
                            "   [{}] {} ({})",
                            category.id,
                            category.name.bold(),
                            category.color
                        );
                    }
                }
                Err(e) => fail(format!("Failed to list categories: {}", e)),
            },

            CategoryCommands::Create { name, color } => {
                let req = CreateCategoryRequest {
                    name: name.clone(),
                    color: color.clone(),
                };

                match client.create_category(req).await {
                    Ok(category) => println!(
                        "{} Category created: [{}] {} ({})",
                        "✓".green(),
                        category.id,
                        category.name,
                        category.color
                    ),
                    Err(e) => fail(format!("Failed to create category: {}", e)),
                }
            }

            CategoryCommands::Update { id, name, color } => {
                let req = UpdateCategoryRequest {
                    name: name.clone(),
                    color: color.clone(),
                };

                match client.update_category(*id, req).await {
                    Ok(category) => println!(
                        "{} Category updated: [{}] {} ({})",
                        "✓".green(),
                        category.id,
                        category.name,
                        category.color
                    ),
                    Err(e) if e.is_not_found() => fail(format!("Category #{} not found", id)),
                    Err(e) => fail(format!("Failed to update category: {}", e)),
                }
            }

            CategoryCommands::Delete { id } => match client.delete_category(*id).await {
                Ok(response) => println!("{} {}", "✓".green(), response.message),
                Err(e) if e.is_not_found() => fail(format!("Category #{} not found", id)),
                Err(e) => fail(format!("Failed to delete category: {}", e)),
            },
        },

        Commands::Health => {
            let response = client
                .health()
                .await
                .context("Server health check failed")?;
            println!("{} {} ({})", "✓".green(), response.status, response.timestamp);
        }
    }

    Ok(())
}
