use footage_feed::build_rocket;
use footage_feed::config::{create_app_state, init_logger, load_environment};
use rocket::launch;

#[launch]
fn rocket() -> _ {
    load_environment();
    init_logger();

    match create_app_state().and_then(build_rocket) {
        Ok(rocket) => rocket,
        Err(e) => {
            log::error!("Failed to initialise footage feed: {e:?}");
            std::process::exit(1);
        }
    }
}
