use actix_cors::Cors;
use actix_web::{
    dev::Server,
    error::{InternalError, JsonPayloadError},
    http::{header, StatusCode},
    web::{self, Data},
    App, HttpRequest, HttpServer,
};
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::TcpListener, sync::Arc};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{
        DatabaseSettings, EmbeddingProvider, Settings, StorageBackend, VectorIndexBackend,
        VectorIndexSettings,
    },
    controllers::{
        create_account, create_content, delete_content, health_check, json_error_response,
        list_contents, log_in_account, reindex_content, search_content, sign_in_account,
    },
    domain::{
        services::{
            hashing_embedding::HashingEmbeddingsService,
            openai_embedding::OpenAiEmbeddingsService,
        },
        use_cases::{
            delete_content::DeleteContentUseCase, ingest_content::IngestContentUseCase,
            list_contents::ListContentsUseCase, reindex_content::ReindexContentUseCase,
            search_content::SearchContentUseCase,
        },
    },
    handlers::index_reconciliation::spawn_index_reconciliation,
    middlewares::{
        jwt_authentication::RequireAuth,
        rate_limiting::{FixedWindowRateLimiter, RateLimit},
        security_headers::security_headers,
    },
    ports::{
        content_point_repository::{ContentPointRepository, ContentPointRepositoryError},
        content_repository::ContentRepository,
        embedding_service::{EmbeddingService, EmbeddingServiceError},
        user_repository::UserRepository,
    },
    repositories::{
        authentication_jwt_repository::AuthenticationJwtRepository,
        content_in_memory_repository::ContentInMemoryRepository,
        content_point_in_memory_repository::ContentPointInMemoryRepository,
        content_point_qdrant_repository::ContentPointQdrantRepository,
        content_postgres_repository::ContentPostgresRepository,
        user_in_memory_repository::UserInMemoryRepository,
        user_postgres_repository::UserPostgresRepository,
    },
};

/// External services the application talks to, behind their ports
///
/// Built once from the settings, or injected (ex: by integration tests).
#[derive(Clone)]
pub struct Adapters {
    pub user_repository: Arc<dyn UserRepository>,
    pub content_repository: Arc<dyn ContentRepository>,
    pub content_point_repository: Arc<dyn ContentPointRepository>,
    pub embedding_service: Arc<dyn EmbeddingService>,
}

impl Adapters {
    /// Adapters keeping everything in the process memory, with a hashing embeddings service
    pub fn in_memory(embedding_dimension: usize) -> Self {
        Self {
            user_repository: Arc::new(UserInMemoryRepository::new()),
            content_repository: Arc::new(ContentInMemoryRepository::new()),
            content_point_repository: Arc::new(ContentPointInMemoryRepository::new()),
            embedding_service: Arc::new(HashingEmbeddingsService::new(embedding_dimension)),
        }
    }

    #[tracing::instrument(name = "Building adapters", skip(settings))]
    pub async fn try_from_settings(settings: &Settings) -> Result<Self, ApplicationBuildError> {
        let (user_repository, content_repository) = match settings.database.backend {
            StorageBackend::Postgres => {
                let pool = get_connection_pool(&settings.database);
                sqlx::migrate!("../migrations").run(&pool).await?;
                info!("Database migrated");

                let user_repository: Arc<dyn UserRepository> =
                    Arc::new(UserPostgresRepository::new(pool.clone()));
                let content_repository: Arc<dyn ContentRepository> =
                    Arc::new(ContentPostgresRepository::new(pool));
                (user_repository, content_repository)
            }
            StorageBackend::InMemory => {
                let user_repository: Arc<dyn UserRepository> =
                    Arc::new(UserInMemoryRepository::new());
                let content_repository: Arc<dyn ContentRepository> =
                    Arc::new(ContentInMemoryRepository::new());
                (user_repository, content_repository)
            }
        };

        let embedding_service: Arc<dyn EmbeddingService> = match settings.embedding.provider {
            EmbeddingProvider::OpenAi => {
                Arc::new(OpenAiEmbeddingsService::try_new(&settings.embedding)?)
            }
            EmbeddingProvider::Hashing => {
                Arc::new(HashingEmbeddingsService::new(settings.embedding.dimension))
            }
        };

        let content_point_repository: Arc<dyn ContentPointRepository> =
            match settings.vector_index.backend {
                VectorIndexBackend::Qdrant => Arc::new(
                    ContentPointQdrantRepository::try_new(
                        get_qdrant_client(&settings.vector_index)?,
                        &settings.vector_index.collection,
                        &settings.vector_index.collection_distance,
                        embedding_service.dimension() as u64,
                    )
                    .await?,
                ),
                VectorIndexBackend::InMemory => Arc::new(ContentPointInMemoryRepository::new()),
            };

        Ok(Self {
            user_repository,
            content_repository,
            content_point_repository,
            embedding_service,
        })
    }
}

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
    index_reconciliation: Option<JoinHandle<()>>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    EmbeddingServiceError(#[from] EmbeddingServiceError),
    #[error(transparent)]
    ContentPointRepositoryError(#[from] ContentPointRepositoryError),
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),
}

impl Application {
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let adapters = Adapters::try_from_settings(&settings).await?;
        Self::build_with_adapters(settings, nb_workers, adapters).await
    }

    /// Builds the application on top of already built adapters
    pub async fn build_with_adapters(
        settings: Settings,
        nb_workers: Option<usize>,
        adapters: Adapters,
    ) -> Result<Self, ApplicationBuildError> {
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let reindex_content_use_case = Arc::new(ReindexContentUseCase::new(
            adapters.content_repository.clone(),
            adapters.content_point_repository.clone(),
            adapters.embedding_service.clone(),
        ));

        let index_reconciliation = if settings.reconciliation.enabled {
            Some(spawn_index_reconciliation(
                reindex_content_use_case.clone(),
                &settings.reconciliation,
            ))
        } else {
            None
        };

        let server = run(
            listener,
            settings,
            nb_workers,
            adapters,
            reindex_content_use_case,
        )?;

        Ok(Self {
            server,
            port,
            index_reconciliation,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        let result = self.server.await;

        if let Some(index_reconciliation) = self.index_reconciliation {
            index_reconciliation.abort();
        }

        info!("👋 Bye!");
        result
    }
}

/// listener: the consumer binds their own port
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
///
/// Every route goes through the rate limiting, CORS, security headers and the JSON body
/// ceiling. Content and search routes also require a valid access token.
///
/// # Parameters
/// - nb_workers: number of actix-web workers
///   if `None`, the number of available physical CPUs is used as the worker count.
pub fn run(
    listener: TcpListener,
    settings: Settings,
    nb_workers: Option<usize>,
    adapters: Adapters,
    reindex_content_use_case: Arc<ReindexContentUseCase>,
) -> Result<Server, std::io::Error> {
    // Wraps repositories and use cases in a `actix_web::Data` (`Arc`) to be able to register them
    // and access them from handlers.
    // Those are shared among all threads.
    let auth_repository = Data::new(AuthenticationJwtRepository::new(
        settings.authentication.jwt_secret.clone(),
        settings.authentication.jwt_expire_in_s,
    ));
    let user_repository: Data<dyn UserRepository> = Data::from(adapters.user_repository.clone());

    let ingest_content_use_case = Data::new(IngestContentUseCase::new(
        adapters.content_repository.clone(),
        adapters.content_point_repository.clone(),
        adapters.embedding_service.clone(),
    ));
    let list_contents_use_case = Data::new(ListContentsUseCase::new(adapters.content_repository.clone()));
    let delete_content_use_case = Data::new(DeleteContentUseCase::new(
        adapters.content_repository.clone(),
        adapters.content_point_repository.clone(),
    ));
    let search_content_use_case = Data::new(SearchContentUseCase::new(
        adapters.content_point_repository.clone(),
        adapters.embedding_service.clone(),
    ));
    let reindex_content_use_case = Data::from(reindex_content_use_case);

    // One limiter for all the workers, so the count is per client and not per worker
    let rate_limiter = Arc::new(FixedWindowRateLimiter::from_settings(
        &settings.application.rate_limit,
    ));
    let allowed_origin = settings.application.allowed_origin.clone();
    let json_config = web::JsonConfig::default()
        .limit(settings.application.max_body_size_bytes)
        .error_handler(json_error_handler);

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RateLimit::new(rate_limiter.clone()))
            .wrap(cors(&allowed_origin))
            .wrap(security_headers())
            .wrap(TracingLogger::default())
            .app_data(json_config.clone())
            .app_data(auth_repository.clone())
            .app_data(user_repository.clone())
            .app_data(ingest_content_use_case.clone())
            .app_data(list_contents_use_case.clone())
            .app_data(delete_content_use_case.clone())
            .app_data(search_content_use_case.clone())
            .app_data(reindex_content_use_case.clone())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(create_account))
                    .route("/signin", web::post().to(sign_in_account))
                    .route("/login", web::post().to(log_in_account)),
            )
            .service(
                web::resource("/content")
                    .route(web::post().to(create_content))
                    .route(web::get().to(list_contents))
                    .wrap(RequireAuth::new(auth_repository.clone())),
            )
            .service(
                web::resource("/content/{id}")
                    .route(web::delete().to(delete_content))
                    .wrap(RequireAuth::new(auth_repository.clone())),
            )
            .service(
                web::resource("/content/{id}/reindex")
                    .route(web::post().to(reindex_content))
                    .wrap(RequireAuth::new(auth_repository.clone())),
            )
            .service(
                web::resource("/search")
                    .route(web::post().to(search_content))
                    .wrap(RequireAuth::new(auth_repository.clone())),
            )
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

/// Browsers may only call the API from the configured origin, with credentials
fn cors(allowed_origin: &str) -> Cors {
    let cors = if allowed_origin == "*" {
        Cors::default().allow_any_origin()
    } else {
        Cors::default().allowed_origin(allowed_origin)
    };

    cors.allowed_methods(vec!["GET", "POST", "DELETE"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ])
        .supports_credentials()
        .max_age(3600)
}

/// Oversized bodies are answered with a 413, any other invalid JSON body with a 400
fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let (status, message) = match &error {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large")
        }
        JsonPayloadError::ContentType => (
            StatusCode::BAD_REQUEST,
            "Request body must be JSON (Content-Type: application/json)",
        ),
        _ => (StatusCode::BAD_REQUEST, "Invalid JSON body"),
    };

    info!(?error, "Rejected request body");
    InternalError::from_response(error, json_error_response(status, message)).into()
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}

/// Set up a client to Qdrant
pub fn get_qdrant_client(settings: &VectorIndexSettings) -> Result<QdrantClient, ApplicationBuildError> {
    let mut qdrant_config = QdrantClientConfig::from_url(&settings.get_grpc_base_url());
    if let Some(api_key) = &settings.api_key {
        qdrant_config.set_api_key(api_key.expose_secret());
    }

    QdrantClient::new(Some(qdrant_config))
        .map_err(|e| ApplicationBuildError::QdrantError(e.to_string()))
}
