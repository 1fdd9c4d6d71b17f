use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use client_core::{
    screens::{
        DetailScreen, DetailState, HomeScreen, Notification, NotificationCenter,
        NotificationOutcome, OnboardingFlow, PermissionStatus, ProfileScreen, QuantitySelector,
        SearchScreen,
    },
    startup_route, MealDbClient, RecipeRepository, RecipeSource, Route, ScreenEvent,
};
use shared::domain::Recipe;
use storage::Storage;
use tokio::{sync::broadcast, task::JoinHandle, time::sleep};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_database_url, Settings};

const TYPING_INTERVAL: Duration = Duration::from_millis(80);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(about = "Browse MealDB recipes from the terminal")]
struct Args {
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    reveal_delay_ms: Option<u64>,
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print where the app would open: onboarding or the main tabs.
    Start,
    /// Walk through the introduction slides and mark onboarding done.
    Onboard,
    /// Forget onboarding so the next start shows the introduction again.
    ResetOnboarding,
    /// Load the home feed.
    Feed,
    /// Type a query into the search screen.
    Search {
        query: String,
    },
    /// Open a recipe's detail page.
    Show {
        id: Option<String>,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Send the profile screen's test notification.
    Notify,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();
    let settings = apply_args(load_settings(), &args);

    match args.command {
        Command::Start => {
            let storage = open_storage(&settings).await?;
            let route = startup_route(&storage).await;
            println!("start route: {route:?}");
        }
        Command::Onboard => {
            let storage = open_storage(&settings).await?;
            let mut flow = OnboardingFlow::new();
            loop {
                let slide = flow.current_slide();
                println!("[{}] {}: {}", flow.current_index() + 1, slide.title, slide.description);
                if !flow.next() {
                    break;
                }
            }
            let route = flow.finish(&storage).await?;
            println!("onboarding finished, opening {route:?}");
        }
        Command::ResetOnboarding => {
            let storage = open_storage(&settings).await?;
            let home = HomeScreen::new(recipe_source(&settings)?, settings.screen_settings());
            match home.reset_onboarding(&storage).await {
                Some(route) => println!("onboarding reset, next start opens {route:?}"),
                None => println!("could not reset onboarding"),
            }
        }
        Command::Feed => {
            let home = HomeScreen::new(recipe_source(&settings)?, settings.screen_settings());
            let printer = spawn_printer(home.subscribe_events());
            let mode = home.load().await;
            info!(?mode, "feed presented");
            while home.is_revealing() {
                sleep(POLL_INTERVAL).await;
            }
            for section in home.sections() {
                println!("== {} ({})", section.title, section.subtitle);
                for recipe in &section.recipes {
                    println!("   {}", describe(recipe));
                }
            }
            drop(home);
            printer.await?;
        }
        Command::Search { query } => {
            let search = SearchScreen::new(recipe_source(&settings)?, settings.screen_settings());
            let printer = spawn_printer(search.subscribe_events());
            println!("suggestions: {}", search.suggestion_chips().join(", "));
            search.load_defaults().await;

            let mut typed = String::new();
            for ch in query.chars() {
                typed.push(ch);
                search.on_text_changed(&typed);
                sleep(TYPING_INTERVAL).await;
            }
            while search.has_pending_search() || search.is_revealing() {
                sleep(POLL_INTERVAL).await;
            }
            for recipe in search.visible() {
                println!("   {}", describe(&recipe));
            }
            drop(search);
            printer.await?;
        }
        Command::Show { id, quantity } => {
            let detail = DetailScreen::new(recipe_source(&settings)?);
            let printer = spawn_printer(detail.subscribe_events());
            if let DetailState::Loaded(detail) = detail.open(id.as_deref()).await {
                let recipe = &detail.recipe;
                println!("{} ({} / {})", recipe.name, recipe.category, recipe.area);
                println!("rating {:.1}, {} comments", detail.rating, detail.comments);
                for ingredient in &recipe.ingredients {
                    println!("  - {} {}", ingredient.measure, ingredient.name);
                }
                println!("{}", recipe.instructions);
                if let Some(price) = recipe.price {
                    let mut selector = QuantitySelector::new(price);
                    for _ in 1..quantity {
                        selector.increment();
                    }
                    println!("{} x {} = {}", selector.quantity(), price, selector.total());
                }
            }
            drop(detail);
            printer.await?;
        }
        Command::Notify => {
            let profile = ProfileScreen::new(Arc::new(LogNotificationCenter));
            let printer = spawn_printer(profile.subscribe_events());
            let outcome = profile.send_test_notification().await;
            if outcome != NotificationOutcome::Sent {
                info!(?outcome, "notification not sent");
            }
            drop(profile);
            printer.await?;
        }
    }

    Ok(())
}

fn apply_args(mut settings: Settings, args: &Args) -> Settings {
    if let Some(v) = &args.base_url {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = &args.database_url {
        settings.database_url = normalize_database_url(v);
    }
    if let Some(v) = args.reveal_delay_ms {
        settings.reveal_delay_ms = v;
    }
    if let Some(v) = args.debounce_ms {
        settings.debounce_ms = v;
    }
    settings
}

async fn open_storage(settings: &Settings) -> Result<Storage> {
    Storage::new(&settings.database_url)
        .await
        .with_context(|| format!("failed to open flag store at {}", settings.database_url))
}

fn recipe_source(settings: &Settings) -> Result<Arc<dyn RecipeSource>> {
    let client = MealDbClient::new(&settings.api_base_url)
        .with_context(|| format!("invalid api base url {}", settings.api_base_url))?;
    let repository =
        RecipeRepository::new(client).with_artificial_latency(settings.artificial_latency());
    Ok(Arc::new(repository))
}

fn describe(recipe: &Recipe) -> String {
    match recipe.price {
        Some(price) => format!("{} [{}] ${price}", recipe.name, recipe.category),
        None => format!("{} [{}]", recipe.name, recipe.category),
    }
}

/// Prints screen events until every sender is gone.
fn spawn_printer(mut events: broadcast::Receiver<ScreenEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    info!(skipped, "display lagged behind screen events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn print_event(event: &ScreenEvent) {
    match event {
        ScreenEvent::ItemsChanged { screen, items } => {
            let names: Vec<_> = items.iter().map(|r| r.name.as_str()).collect();
            println!("[{screen:?}] {} shown: {}", items.len(), names.join(" | "));
        }
        ScreenEvent::LoadingChanged { screen, loading } => {
            println!("[{screen:?}] loading={loading}");
        }
        ScreenEvent::RefreshingChanged(refreshing) => println!("refreshing={refreshing}"),
        ScreenEvent::SearchCompleted { query, results } => {
            println!("search \"{query}\": {results} results");
        }
        ScreenEvent::Alert {
            screen,
            title,
            message,
            offer_back,
            ..
        } => {
            println!("[{screen:?}] ALERT {title}: {message}");
            if *offer_back {
                println!("[{screen:?}] (Go back)");
            }
        }
        ScreenEvent::Navigate(route) => match route {
            Route::Detail(id) => println!("navigate to recipe {id}"),
            other => println!("navigate to {other:?}"),
        },
    }
}

/// Terminal stand-in for the platform notification service.
struct LogNotificationCenter;

#[async_trait]
impl NotificationCenter for LogNotificationCenter {
    async fn permission_status(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    async fn request_permission(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    async fn schedule(&self, notification: Notification) -> Result<()> {
        let payload = serde_json::to_string(&notification)?;
        info!(%payload, "notification scheduled");
        Ok(())
    }
}
