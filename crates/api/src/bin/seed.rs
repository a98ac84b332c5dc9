//! Seeds the database with the demonstration data set: three named users,
//! the fixed demo clubs with their role assignments, a batch of filler
//! players, and one upcoming tournament. Safe to re-run; existing rows
//! are kept.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use api::auth::PasswordService;
use infra::models::Experience;
use infra::roles::Role;

const DEFAULT_PASSWORD: &str = "Password123";
const FILLER_USER_COUNT: usize = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let pool = PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("seeding data...");
    let password_hash = PasswordService::hash_password(DEFAULT_PASSWORD)?;

    let jeb = ensure_user(
        &pool,
        "jeb@example.org",
        "Jebediah Kerman",
        Experience::Beginner,
        "",
        &password_hash,
    )
    .await?;
    let val = ensure_user(
        &pool,
        "val@example.org",
        "Valentina Kerman",
        Experience::Advanced,
        "",
        &password_hash,
    )
    .await?;
    let billie = ensure_user(
        &pool,
        "billie@example.org",
        "Billie Kerman",
        Experience::Intermediate,
        "",
        &password_hash,
    )
    .await?;

    let kerbal = ensure_club(&pool, "Kerbal Chess Club", "Bush House", "Founded by B. Kerman").await?;
    let pep = ensure_club(&pool, "PEP Chess Club", "Bush House", "C++ and Scala").await?;
    let ins = ensure_club(&pool, "INS Chess Club", "Bush House", "Wireshark and HTML").await?;
    let seg = ensure_club(&pool, "SEG Chess Club", "Bush House", "Python and Django").await?;

    ensure_membership(&pool, billie, kerbal, Role::Owner).await?;
    ensure_membership(&pool, val, kerbal, Role::Officer).await?;
    ensure_membership(&pool, jeb, kerbal, Role::Member).await?;
    ensure_membership(&pool, billie, pep, Role::Owner).await?;
    ensure_membership(&pool, jeb, pep, Role::Officer).await?;
    ensure_membership(&pool, val, ins, Role::Owner).await?;
    ensure_membership(&pool, val, seg, Role::Owner).await?;
    ensure_membership(&pool, billie, seg, Role::Member).await?;

    let mut players = Vec::new();
    for i in 1..=FILLER_USER_COUNT {
        let experience = Experience::from_level((i % 4 + 1) as i16).unwrap_or(Experience::Beginner);
        let player = ensure_user(
            &pool,
            &format!("player{i:02}@example.org"),
            &format!("Player {i:02}"),
            experience,
            "Seeded demonstration account.",
            &password_hash,
        )
        .await?;
        players.push(player);
    }

    // Half the filler players join the Kerbal club, the next few leave
    // applications pending for the officers to work through.
    for player in players.iter().take(FILLER_USER_COUNT / 2) {
        ensure_membership(&pool, *player, kerbal, Role::Member).await?;
    }
    for player in players.iter().skip(FILLER_USER_COUNT / 2).take(5) {
        ensure_application(&pool, *player, kerbal, "I would love to join your club!").await?;
    }

    let deadline = (Utc::now() + Duration::days(30)).date_naive();
    let spring_open = ensure_tournament(
        &pool,
        kerbal,
        val,
        "Kerbal Spring Open",
        "Open rapid tournament for all Kerbal members",
        deadline,
        8,
    )
    .await?;
    for player in players.iter().take(4) {
        ensure_entry(&pool, *player, spring_open).await?;
    }

    tracing::info!("done");
    Ok(())
}

async fn ensure_user(
    pool: &PgPool,
    email: &str,
    name: &str,
    experience: Experience,
    bio: &str,
    password_hash: &str,
) -> anyhow::Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, name, experience, bio, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(experience.level())
    .bind(bio)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    tracing::info!(email, "seeded user");
    Ok(id)
}

async fn ensure_club(
    pool: &PgPool,
    name: &str,
    location: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM clubs WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO clubs (name, location, description) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(location)
    .bind(description)
    .fetch_one(pool)
    .await?;
    tracing::info!(name, "seeded club");
    Ok(id)
}

async fn ensure_membership(
    pool: &PgPool,
    user_id: Uuid,
    club_id: Uuid,
    role: Role,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO memberships (user_id, club_id, role)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(club_id)
    .bind(role.rank())
    .execute(pool)
    .await?;
    Ok(())
}

async fn ensure_application(
    pool: &PgPool,
    user_id: Uuid,
    club_id: Uuid,
    statement: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO applications (user_id, club_id, statement)
        VALUES ($1, $2, $3)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(club_id)
    .bind(statement)
    .execute(pool)
    .await?;
    Ok(())
}

async fn ensure_tournament(
    pool: &PgPool,
    club_id: Uuid,
    organiser_id: Uuid,
    name: &str,
    description: &str,
    deadline: chrono::NaiveDate,
    capacity: i32,
) -> anyhow::Result<Uuid> {
    if let Some(id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM tournaments WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO tournaments (club_id, organiser_id, name, description, deadline, capacity)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(club_id)
    .bind(organiser_id)
    .bind(name)
    .bind(description)
    .bind(deadline)
    .bind(capacity)
    .fetch_one(pool)
    .await?;
    tracing::info!(name, "seeded tournament");
    Ok(id)
}

async fn ensure_entry(pool: &PgPool, user_id: Uuid, tournament_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tournament_entries (user_id, tournament_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(tournament_id)
    .execute(pool)
    .await?;
    Ok(())
}
