use actix_cors::Cors;
use actix_web::{get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;

use leavedesk::database::{
    init_database,
    repositories::{
        EmployeeRepository, EntitlementRepository, LeaveRequestRepository, LeaveTypeRepository,
    },
};
use leavedesk::handlers::{entitlements, leave_requests};
use leavedesk::{BusinessCalendar, Config, LeaveService};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("LeaveDesk API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting LeaveDesk API server...");

    // Load configuration
    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    // Initialize database
    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    // Initialize repositories and the leave service
    let employee_repository = EmployeeRepository::new(pool.clone());
    let leave_type_repository = LeaveTypeRepository::new(pool.clone());
    let leave_request_repository = LeaveRequestRepository::new(pool.clone());
    let entitlement_repository = EntitlementRepository::new(pool.clone());
    let calendar = BusinessCalendar::new(config.holidays.clone());

    let leave_service = LeaveService::new(
        pool,
        employee_repository,
        leave_type_repository,
        leave_request_repository,
        entitlement_repository,
        calendar,
    );

    let leave_service_data = web::Data::new(leave_service);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(leave_service_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/leave-requests")
                            .route(
                                "",
                                web::post().to(leave_requests::create_leave_request),
                            )
                            .route("", web::get().to(leave_requests::get_leave_requests))
                            .route("/{id}", web::get().to(leave_requests::get_leave_request))
                            .route(
                                "/{id}",
                                web::put().to(leave_requests::update_leave_request),
                            )
                            .route(
                                "/{id}",
                                web::delete().to(leave_requests::delete_leave_request),
                            )
                            .route(
                                "/{id}/submit",
                                web::post().to(leave_requests::submit_leave_request),
                            )
                            .route(
                                "/{id}/approve",
                                web::post().to(leave_requests::approve_leave_request),
                            )
                            .route(
                                "/{id}/reject",
                                web::post().to(leave_requests::reject_leave_request),
                            )
                            .route(
                                "/{id}/cancel",
                                web::post().to(leave_requests::cancel_leave_request),
                            ),
                    )
                    .service(
                        web::scope("/entitlements")
                            .route("", web::get().to(entitlements::get_entitlements))
                            .route("", web::post().to(entitlements::ensure_entitlement))
                            .route(
                                "/carry-over",
                                web::post().to(entitlements::carry_over_entitlement),
                            ),
                    ),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
