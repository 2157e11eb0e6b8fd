use std::{process, sync::Arc};

use pluma::{
    application::{
        auth::AuthService,
        error::AppError,
        feed::{FeedService, ListingSizes},
        follows::FollowService,
        posts::PostService,
        repos::{
            CommentsRepo, FollowsRepo, GroupsRepo, PostsRepo, PostsWriteRepo, SessionsRepo,
            UsersRepo,
        },
    },
    cache::{CacheConfig, CacheState},
    config,
    infra::{
        db::SqliteRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Groups(args) => run_groups(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings);
    serve_http(&settings, state).await
}

async fn run_groups(settings: config::Settings, args: config::GroupsArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    match args.command {
        config::GroupsCommand::Add(cmd) => {
            let slug = cmd
                .slug
                .clone()
                .unwrap_or_else(|| slug::slugify(&cmd.title));
            let group = repositories
                .create_group(&cmd.title, &slug, &cmd.description)
                .await
                .map_err(|err| AppError::unexpected(format!("failed to create group: {err}")))?;
            info!(
                target = "pluma::groups",
                id = group.id,
                slug = %group.slug,
                "group created"
            );
        }
    }
    Ok(())
}

async fn init_repositories(settings: &config::Settings) -> Result<Arc<SqliteRepositories>, AppError> {
    let pool = SqliteRepositories::connect(
        &settings.database.url,
        settings.database.max_connections.get(),
    )
    .await
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    SqliteRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(SqliteRepositories::new(pool)))
}

fn build_http_state(repositories: Arc<SqliteRepositories>, settings: &config::Settings) -> HttpState {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let groups_repo: Arc<dyn GroupsRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories.clone();
    let follows_repo: Arc<dyn FollowsRepo> = repositories.clone();

    let sizes = ListingSizes {
        index: settings.listings.index_page_size.get(),
        group: settings.listings.group_page_size.get(),
        profile: settings.listings.profile_page_size.get(),
        follow: settings.listings.follow_page_size.get(),
    };

    let feed = Arc::new(FeedService::new(
        posts_repo.clone(),
        comments_repo.clone(),
        groups_repo.clone(),
        users_repo.clone(),
        follows_repo.clone(),
        sizes,
    ));
    let posts = Arc::new(PostService::new(
        posts_repo,
        posts_write_repo,
        comments_repo,
    ));
    let follows = Arc::new(FollowService::new(follows_repo, users_repo.clone()));
    let auth = Arc::new(AuthService::new(users_repo, sessions_repo));

    let cache_config = CacheConfig::from(&settings.cache);
    let cache = cache_config
        .enabled
        .then(|| CacheState::new(cache_config));

    HttpState {
        feed,
        posts,
        follows,
        auth,
        groups: groups_repo,
        db: repositories,
        cache,
    }
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "pluma::server",
        addr = %settings.server.addr,
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}
