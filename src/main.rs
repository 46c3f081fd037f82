use squadhours::api;
use squadhours::application_port::SignupInput;
use squadhours::logger::*;
use squadhours::server::*;
use squadhours::settings::*;
use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap()?;

    let project_settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_settings(&project_settings.log)?;

    let server = Arc::new(Server::try_new(&project_settings).await?);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(server.clone(), &project_settings.http).await,
        Command::CreateUser {
            email,
            name,
            password,
        } => create_user(&server, email, name, password).await,
    };

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server.shutdown()).await {
        Ok(_) => info!("server shutdown successfully"),
        Err(_) => error!("server shutdown timed out"),
    }

    result
}

async fn serve(server: Arc<Server>, http: &Http) -> anyhow::Result<()> {
    let address: SocketAddr = http.address.parse()?;
    let routes = api::routes(server);
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("could not listen for ctrl-c: {}", e);
        }
    };

    match (&http.cert_path, &http.key_path) {
        (Some(cert_path), Some(key_path)) => {
            ensure_regular_file("TLS cert", cert_path)?;
            ensure_regular_file("TLS key", key_path)?;
            let (bound, running) = warp::serve(routes)
                .tls()
                .cert_path(cert_path)
                .key_path(key_path)
                .bind_with_graceful_shutdown(address, shutdown);
            info!(%bound, "listening (https)");
            running.await;
        }
        (None, None) => {
            let (bound, running) =
                warp::serve(routes).try_bind_with_graceful_shutdown(address, shutdown)?;
            info!(%bound, "listening (http)");
            running.await;
        }
        _ => {
            return Err(anyhow::anyhow!(
                "http.cert_path and http.key_path must be set together"
            ));
        }
    }

    Ok(())
}

async fn create_user(
    server: &Server,
    email: String,
    name: String,
    password: String,
) -> anyhow::Result<()> {
    let user = server
        .auth_service
        .create_user(SignupInput {
            email,
            name,
            password,
        })
        .await?;
    info!(user_id = %user.id, email = %user.email, "user created");
    Ok(())
}

fn ensure_regular_file(what: &str, path: &str) -> anyhow::Result<()> {
    if !fs::metadata(path)?.is_file() {
        return Err(anyhow::anyhow!("{} is not a regular file: {:?}", what, path));
    }
    Ok(())
}
