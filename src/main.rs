mod config;
mod errors;
mod handlers;
mod middleware;
mod models;
mod moderation;
mod pagination;
mod responses;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use handlers::{
    auth::{forgot_password, login, reset_password, signup, verify_account},
    blog::{admin_list_posts, create_post, get_post_by_slug, list_posts, review_post},
    developments::{
        admin_list_developments, create_development, delete_development, list_developments,
        update_development,
    },
    properties::{
        admin_list_properties, create_property, delete_property, get_property, increment_view,
        list_properties, my_listings, update_property, update_property_status,
    },
    testimonials::{create_testimonial, delete_testimonial, list_testimonials},
    users::{admin_list_users, get_current_user, list_agents, update_user_role},
};
use middleware::Authentication;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database = config::init_database()
        .await
        .expect("Failed to connect to database");

    let port = config::get_port();
    let frontend_url = config::get_frontend_url();

    // 60 requests per minute per client
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(1)
        .burst_size(60)
        .finish()
        .unwrap();

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_origin("http://localhost:5173")
            .allow_any_method()
            .allow_any_header();
        if let Some(origin) = &frontend_url {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(Governor::new(&governor_conf))
            .wrap(Authentication)
            .app_data(web::Data::new(database.clone()))
            .service(
                web::scope("/api")
                    .service(signup)
                    .service(login)
                    .service(forgot_password)
                    .service(reset_password)
                    .service(verify_account)
                    // fixed paths before `{id}` routes
                    .service(my_listings)
                    .service(list_properties)
                    .service(create_property)
                    .service(get_property)
                    .service(update_property)
                    .service(delete_property)
                    .service(update_property_status)
                    .service(increment_view)
                    .service(admin_list_properties)
                    .service(list_developments)
                    .service(admin_list_developments)
                    .service(create_development)
                    .service(update_development)
                    .service(delete_development)
                    .service(list_posts)
                    .service(get_post_by_slug)
                    .service(create_post)
                    .service(admin_list_posts)
                    .service(review_post)
                    .service(list_testimonials)
                    .service(create_testimonial)
                    .service(delete_testimonial)
                    .service(admin_list_users)
                    .service(update_user_role)
                    .service(list_agents)
                    .service(get_current_user),
            )
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
