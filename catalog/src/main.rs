use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog::{ClientConfig, CollectionSort, Nft, ServicesAssembly, UserSort};

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "NFT marketplace client", long_about = None)]
struct Cli {
    /// Cap on concurrent NFT lookups (overrides CATALOG_MAX_CONCURRENCY)
    #[arg(long)]
    max_concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch NFTs by id
    Nfts {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List collections
    Collections {
        #[arg(short, long, value_enum, default_value_t = SortArg::None)]
        sort: SortArg,
    },

    /// Show the NFTs in an order
    Cart { order_id: String },

    /// Remove an NFT from an order
    Remove { order_id: String, nft_id: String },

    /// List payment currencies
    Currencies,

    /// Pay for an order
    Pay {
        order_id: String,
        currency_id: String,
    },

    /// Show the user leaderboard
    Leaderboard {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,

        #[arg(short, long, value_enum, default_value_t = RankArg::Count)]
        sort: RankArg,
    },

    /// Download and decode an image
    Image { url: String },

    /// Show the profile
    Profile,

    /// Change profile fields; omitted fields keep their current value
    EditProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Show the NFTs the profile owns
    MyNfts,

    /// Show the NFTs the profile likes
    Favorites,

    /// Like or unlike an NFT
    Like { nft_id: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    None,
    Name,
    Count,
}

#[derive(Clone, Copy, ValueEnum)]
enum RankArg {
    Name,
    Count,
}

impl From<RankArg> for UserSort {
    fn from(arg: RankArg) -> Self {
        match arg {
            RankArg::Name => UserSort::ByName,
            RankArg::Count => UserSort::ByNftCount,
        }
    }
}

fn print_nfts(nfts: &[Nft]) {
    if nfts.is_empty() {
        println!("No NFTs");
    }
    for nft in nfts {
        println!("{}  {:<30} {:>10.2}  rating {}", nft.id, nft.name, nft.price, nft.rating);
    }
}

impl From<SortArg> for CollectionSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::None => CollectionSort::None,
            SortArg::Name => CollectionSort::ByName,
            SortArg::Count => CollectionSort::ByNftCount,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "catalog=info,catalog_cache=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("Failed to load client configuration")?;
    if let Some(max) = cli.max_concurrency {
        config.cache.max_concurrency = Some(max);
        config.validate()?;
    }
    let services = ServicesAssembly::new(config).context("Failed to build services")?;

    match cli.command {
        Commands::Nfts { ids } => {
            let nft_service = services.nft_service();
            match nft_service.fetch_nfts(ids).await {
                Ok(nfts) => {
                    print_nfts(&nfts);
                    println!("\n{} NFTs", nfts.len());
                }
                Err(failure) => {
                    let cached = nft_service.cache().len().await;
                    println!(
                        "{} lookups failed ({} NFTs cached, run again to retry the rest)",
                        failure.failure_count, cached
                    );
                    return Err(failure.into());
                }
            }
        }

        Commands::Collections { sort } => {
            let collections = services
                .nft_service()
                .fetch_collections(sort.into())
                .await
                .context("Failed to fetch collections")?;
            for collection in collections {
                println!(
                    "{}  {:<30} {:>3} NFTs  by {}",
                    collection.id,
                    collection.name,
                    collection.nfts.len(),
                    collection.author
                );
            }
        }

        Commands::Cart { ref order_id } => {
            let items = services
                .cart_service()
                .load_cart_items(order_id)
                .await
                .with_context(|| format!("Failed to load order {}", order_id))?;
            if items.is_empty() {
                println!("Cart is empty");
            }
            let total: f64 = items.iter().map(|nft| nft.price).sum();
            for nft in &items {
                println!("{}  {:<30} {:>10.2}", nft.id, nft.name, nft.price);
            }
            if !items.is_empty() {
                println!("\n{} items, total {:.2}", items.len(), total);
            }
        }

        Commands::Remove { ref order_id, ref nft_id } => {
            let order = services
                .cart_service()
                .delete_cart_item(order_id, nft_id)
                .await
                .with_context(|| format!("Failed to remove {} from order {}", nft_id, order_id))?;
            println!("Order {} now holds {} NFTs", order.id, order.nfts.len());
        }

        Commands::Currencies => {
            let currencies = services
                .payment_service()
                .fetch_currencies()
                .await
                .context("Failed to fetch currencies")?;
            for currency in currencies {
                println!("{}  {:<8} {}", currency.id, currency.name, currency.title);
            }
        }

        Commands::Pay { ref order_id, ref currency_id } => {
            let payment = services
                .payment_service()
                .make_payment(order_id, currency_id)
                .await
                .context("Payment request failed")?;
            if payment.success {
                println!("Order {} paid (payment {})", payment.order_id, payment.id);
            } else {
                println!("Payment for order {} was declined", payment.order_id);
            }
        }

        Commands::Leaderboard { pages, sort } => {
            let leaderboard = services.statistics_service(sort.into());
            for _ in 0..pages {
                match leaderboard.fetch_next_page().await? {
                    Some(page) if page.items.is_empty() => break,
                    Some(_) | None => {}
                }
            }
            for (rank, user) in leaderboard.users().await.iter().enumerate() {
                println!(
                    "{:>3}. {:<24} {:>4} NFTs",
                    rank + 1,
                    user.name.as_deref().unwrap_or(&user.id),
                    user.nft_count()
                );
            }
        }

        Commands::Image { ref url } => {
            let image = services
                .image_loader()
                .load(url)
                .await
                .with_context(|| format!("Failed to load image {}", url))?;
            println!("{}x{} ({:?})", image.width(), image.height(), image.color());
        }

        Commands::Profile => {
            let profile = services
                .profile_service()
                .load_profile()
                .await
                .context("Failed to load profile")?;
            println!("{} ({})", profile.name, profile.id);
            if let Some(website) = &profile.website {
                println!("  {}", website);
            }
            println!("  owns {} NFTs, likes {}", profile.nfts.len(), profile.likes.len());
        }

        Commands::EditProfile {
            name,
            description,
            website,
            avatar,
        } => {
            let profiles = services.profile_service();
            let current = profiles
                .load_profile()
                .await
                .context("Failed to load profile")?;

            let name = name.unwrap_or(current.name);
            let description = description.or(current.description).unwrap_or_default();
            let website = website.or(current.website).unwrap_or_default();
            let avatar = avatar.or(current.avatar).unwrap_or_default();

            let profile = profiles
                .update_profile(&name, &description, &website, &avatar)
                .await
                .context("Failed to update profile")?;
            println!("Profile saved: {} ({})", profile.name, profile.id);
        }

        Commands::MyNfts => {
            let nfts = services
                .profile_service()
                .load_owned_nfts()
                .await
                .context("Failed to load owned NFTs")?;
            print_nfts(&nfts);
        }

        Commands::Favorites => {
            let nfts = services
                .profile_service()
                .load_liked_nfts()
                .await
                .context("Failed to load liked NFTs")?;
            print_nfts(&nfts);
        }

        Commands::Like { ref nft_id } => {
            let profile = services
                .profile_service()
                .toggle_like(nft_id)
                .await
                .context("Failed to update likes")?;
            if profile.likes(nft_id) {
                println!("Liked {}", nft_id);
            } else {
                println!("Unliked {}", nft_id);
            }
        }
    }

    Ok(())
}
