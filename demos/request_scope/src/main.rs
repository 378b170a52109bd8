use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use stratum::{Container, Context, InstantiateResult, Provider, RegisterErrorKind, Token};
use tracing::info;

// Dependency that will be alive throughout the application
struct Config {
    db_url: &'static str,
}

// Shared by every request, closed with the root container
struct DbPool {
    url: &'static str,
    next_connection: AtomicU64,
}

// One per request, released with the request scope
struct Connection {
    id: u64,
}

struct RequestPath(String);

trait UserRepo: Send + Sync {
    fn find_user(&self, id: u64) -> Option<String>;
}

struct PostgresUserRepo {
    connection: Arc<Connection>,
    users: HashMap<u64, &'static str>,
}

impl UserRepo for PostgresUserRepo {
    fn find_user(&self, id: u64) -> Option<String> {
        self.users
            .get(&id)
            .map(|name| format!("{name} (connection {})", self.connection.id))
    }
}

struct GetUser {
    repo: Arc<Box<dyn UserRepo>>,
    path: Arc<RequestPath>,
}

impl GetUser {
    fn handle(&self, id: u64) -> String {
        match self.repo.find_user(id) {
            Some(user) => format!("{}: {user}", self.path.0),
            None => format!("{}: not found", self.path.0),
        }
    }
}

#[derive(Clone, Copy)]
struct Tokens {
    config: Token<Config>,
    pool: Token<DbPool>,
    connection: Token<Connection>,
    path: Token<RequestPath>,
    user_repo: Token<Box<dyn UserRepo>>,
    get_user: Token<GetUser>,
}

impl Tokens {
    fn new() -> Self {
        Self {
            config: Token::new("Config"),
            pool: Token::new("DbPool"),
            connection: Token::new("Connection"),
            path: Token::new("RequestPath"),
            user_repo: Token::new("UserRepo"),
            get_user: Token::new("GetUser"),
        }
    }
}

// We can use functions as factories instead of closures
fn open_connection(container: &Container, tokens: Tokens) -> InstantiateResult<Connection> {
    let pool = container.resolve(&tokens.pool)?;
    let id = pool.next_connection.fetch_add(1, Ordering::SeqCst);
    info!(id, url = pool.url, "Connection opened");
    Ok(Connection { id })
}

fn bootstrap(config: Config) -> Result<(Container, Tokens), RegisterErrorKind> {
    let tokens = Tokens::new();
    let root = Container::new();

    root.register(&tokens.config, Provider::value(config))?;
    root.register(
        &tokens.pool,
        Provider::singleton(move |container| {
            let config = container.resolve(&tokens.config)?;
            Ok(DbPool {
                url: config.db_url,
                next_connection: AtomicU64::new(1),
            })
        })
        .with_finalizer(|pool: Arc<DbPool>| info!(url = pool.url, "Pool closed")),
    )?;
    root.register(
        &tokens.connection,
        Provider::scoped(move |container| open_connection(container, tokens))
            .with_finalizer(|connection: Arc<Connection>| info!(id = connection.id, "Connection closed")),
    )?;
    // Filled from the request context, a scope without it can't serve requests
    root.register(
        &tokens.path,
        Provider::scoped(|_| Err(anyhow::anyhow!("request path isn't in the context").into())),
    )?;
    root.register(
        &tokens.user_repo,
        Provider::scoped(move |container| {
            Ok(Box::new(PostgresUserRepo {
                connection: container.resolve(&tokens.connection)?,
                users: HashMap::from([(1, "alice"), (2, "bob")]),
            }) as Box<dyn UserRepo>)
        }),
    )?;
    root.register(
        &tokens.get_user,
        Provider::transient(move |container| {
            Ok(GetUser {
                repo: container.resolve(&tokens.user_repo)?,
                path: container.resolve(&tokens.path)?,
            })
        }),
    )?;

    Ok((root, tokens))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();

    let (root, tokens) = bootstrap(Config {
        db_url: "postgres://localhost/app",
    })?;

    let mut handles = Vec::new();
    for (path, user_id) in [("/users/1", 1), ("/users/2", 2), ("/users/3", 3)] {
        let request = root.create_scope_with_context(Context::new().with(&tokens.path, RequestPath(path.to_owned())));
        handles.push(tokio::spawn(async move {
            let use_case = request.resolve(&tokens.get_user)?;
            let response = use_case.handle(user_id);
            // Finalizers of the request are called here, the scope is dropped after
            request.close();
            Ok::<_, anyhow::Error>(response)
        }));
    }

    for handle in handles {
        info!(response = %handle.await??, "Request handled");
    }

    // A scope without the request context fails to build the use case
    if let Err(err) = root.create_scope().resolve(&tokens.get_user) {
        info!(%err, "Request rejected");
    }

    root.close();
    Ok(())
}
