use behalysis_server::{app, config::Config, images::ImageStore, migrator};
use sea_orm::Database;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    behalysis_server::telemetry::init_telemetry("behalysis-server");

    let config = Config::from_env().expect("Invalid configuration");

    // Database Connection
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    std::fs::create_dir_all(&config.images_dir).expect("Failed to create images directory");
    let images = ImageStore::new(&config);

    let addr = config.bind_addr;
    let app = app(db, images);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
