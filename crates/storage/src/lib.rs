mod seed;

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sayahat_core::{
    city_matches, InterestMapping, OpeningHours, Place, PlaceId, PriceLevel, TravelerPreferences,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::debug;

pub use seed::{import_seed, CatalogSeed, SeedSummary};

/// Cached places, looked up by city without regard to case.
pub trait PlaceCatalog: Send + Sync {
    /// Places of one city ordered by id.
    async fn places_in_city(&self, city: &str) -> Result<Vec<Place>>;
    async fn upsert_place(&self, place: Place) -> Result<()>;
}

pub trait PreferenceRepository: Send + Sync {
    async fn load_preferences(&self, user_id: &str) -> Result<Option<TravelerPreferences>>;
    async fn upsert_preferences(
        &self,
        user_id: &str,
        preferences: TravelerPreferences,
    ) -> Result<()>;
}

pub trait InterestMappingRepository: Send + Sync {
    /// Interest -> place types for `provider`; empty when nothing is stored.
    async fn interest_mappings(&self, provider: &str) -> Result<BTreeMap<String, Vec<String>>>;
    async fn upsert_interest_mapping(&self, mapping: InterestMapping) -> Result<()>;
}

fn project_mappings<'a>(
    mappings: impl IntoIterator<Item = &'a InterestMapping>,
    provider: &str,
) -> BTreeMap<String, Vec<String>> {
    mappings
        .into_iter()
        .filter_map(|mapping| {
            mapping
                .types_for(provider)
                .map(|types| (mapping.name.clone(), types.to_vec()))
        })
        .collect()
}

fn city_key(city: &str) -> String {
    city.trim().to_lowercase()
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    places: Arc<RwLock<BTreeMap<PlaceId, Place>>>,
    preferences: Arc<RwLock<HashMap<String, TravelerPreferences>>>,
    interest_mappings: Arc<RwLock<BTreeMap<String, InterestMapping>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaceCatalog for MemoryStore {
    async fn places_in_city(&self, city: &str) -> Result<Vec<Place>> {
        Ok(self
            .places
            .read()
            .values()
            .filter(|place| city_matches(&place.city, city))
            .cloned()
            .collect())
    }

    async fn upsert_place(&self, place: Place) -> Result<()> {
        self.places.write().insert(place.id, place);
        Ok(())
    }
}

impl PreferenceRepository for MemoryStore {
    async fn load_preferences(&self, user_id: &str) -> Result<Option<TravelerPreferences>> {
        Ok(self.preferences.read().get(user_id).cloned())
    }

    async fn upsert_preferences(
        &self,
        user_id: &str,
        preferences: TravelerPreferences,
    ) -> Result<()> {
        self.preferences
            .write()
            .insert(user_id.to_string(), preferences);
        Ok(())
    }
}

impl InterestMappingRepository for MemoryStore {
    async fn interest_mappings(&self, provider: &str) -> Result<BTreeMap<String, Vec<String>>> {
        Ok(project_mappings(
            self.interest_mappings.read().values(),
            provider,
        ))
    }

    async fn upsert_interest_mapping(&self, mapping: InterestMapping) -> Result<()> {
        self.interest_mappings
            .write()
            .insert(mapping.name.clone(), mapping);
        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url {}", database_url))?
            .create_if_missing(true);

        // every connection to :memory: is its own database, so keep exactly one alive
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        debug!(database_url = %database_url, "sqlite catalog ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS places (
              id INTEGER PRIMARY KEY,
              provider_place_id TEXT,
              name TEXT NOT NULL,
              category TEXT NOT NULL,
              types_json TEXT NOT NULL,
              rating REAL,
              rating_count INTEGER,
              address TEXT NOT NULL,
              city TEXT NOT NULL,
              city_key TEXT NOT NULL,
              country TEXT NOT NULL,
              lat REAL,
              lng REAL,
              price_level_json TEXT,
              opening_hours_json TEXT,
              photo_url TEXT,
              website TEXT,
              neighborhood TEXT,
              is_must_visit INTEGER NOT NULL,
              cached_at TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS places_city_key ON places (city_key)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_preferences (
              user_id TEXT PRIMARY KEY,
              budget INTEGER,
              interests_json TEXT NOT NULL,
              travel_style TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interest_mappings (
              name TEXT PRIMARY KEY,
              providers_json TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn place_from_row(row: &SqliteRow) -> Place {
    let types_json: String = row.get("types_json");
    let price_level = row
        .get::<Option<String>, _>("price_level_json")
        .and_then(|raw| serde_json::from_str::<PriceLevel>(&raw).ok());
    let opening_hours = row
        .get::<Option<String>, _>("opening_hours_json")
        .and_then(|raw| serde_json::from_str::<OpeningHours>(&raw).ok());
    let cached_at = row
        .get::<Option<String>, _>("cached_at")
        .and_then(|raw| raw.parse::<DateTime<Utc>>().ok());

    Place {
        id: row.get("id"),
        provider_place_id: row.get("provider_place_id"),
        name: row.get("name"),
        category: row.get("category"),
        types: serde_json::from_str(&types_json).unwrap_or_default(),
        rating: row.get("rating"),
        rating_count: row
            .get::<Option<i64>, _>("rating_count")
            .and_then(|count| u32::try_from(count).ok()),
        address: row.get("address"),
        city: row.get("city"),
        country: row.get("country"),
        lat: row.get("lat"),
        lng: row.get("lng"),
        price_level,
        opening_hours,
        photo_url: row.get("photo_url"),
        website: row.get("website"),
        neighborhood: row.get("neighborhood"),
        is_must_visit: row.get("is_must_visit"),
        cached_at,
    }
}

impl PlaceCatalog for SqliteStore {
    async fn places_in_city(&self, city: &str) -> Result<Vec<Place>> {
        let rows = sqlx::query(
            r#"
            SELECT id, provider_place_id, name, category, types_json, rating, rating_count,
                   address, city, country, lat, lng, price_level_json, opening_hours_json,
                   photo_url, website, neighborhood, is_must_visit, cached_at
            FROM places
            WHERE city_key = ?1
            ORDER BY id
            "#,
        )
        .bind(city_key(city))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed loading places for {}", city))?;

        Ok(rows.iter().map(place_from_row).collect())
    }

    async fn upsert_place(&self, place: Place) -> Result<()> {
        let types_json = serde_json::to_string(&place.types)?;
        let price_level_json = place
            .price_level
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let opening_hours_json = place
            .opening_hours
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO places (
              id, provider_place_id, name, category, types_json, rating, rating_count,
              address, city, city_key, country, lat, lng, price_level_json,
              opening_hours_json, photo_url, website, neighborhood, is_must_visit, cached_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(id) DO UPDATE SET
              provider_place_id=excluded.provider_place_id,
              name=excluded.name,
              category=excluded.category,
              types_json=excluded.types_json,
              rating=excluded.rating,
              rating_count=excluded.rating_count,
              address=excluded.address,
              city=excluded.city,
              city_key=excluded.city_key,
              country=excluded.country,
              lat=excluded.lat,
              lng=excluded.lng,
              price_level_json=excluded.price_level_json,
              opening_hours_json=excluded.opening_hours_json,
              photo_url=excluded.photo_url,
              website=excluded.website,
              neighborhood=excluded.neighborhood,
              is_must_visit=excluded.is_must_visit,
              cached_at=excluded.cached_at
            "#,
        )
        .bind(place.id)
        .bind(&place.provider_place_id)
        .bind(&place.name)
        .bind(&place.category)
        .bind(types_json)
        .bind(place.rating)
        .bind(place.rating_count.map(i64::from))
        .bind(&place.address)
        .bind(&place.city)
        .bind(city_key(&place.city))
        .bind(&place.country)
        .bind(place.lat)
        .bind(place.lng)
        .bind(price_level_json)
        .bind(opening_hours_json)
        .bind(&place.photo_url)
        .bind(&place.website)
        .bind(&place.neighborhood)
        .bind(place.is_must_visit)
        .bind(place.cached_at.map(|at| at.to_rfc3339()))
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed saving place {}", place.id))?;

        Ok(())
    }
}

impl PreferenceRepository for SqliteStore {
    async fn load_preferences(&self, user_id: &str) -> Result<Option<TravelerPreferences>> {
        let row = sqlx::query(
            r#"
            SELECT budget, interests_json, travel_style
            FROM user_preferences
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let interests_json: String = row.get("interests_json");
        Ok(Some(TravelerPreferences {
            budget: row.get("budget"),
            interests: serde_json::from_str(&interests_json).unwrap_or_default(),
            travel_style: row.get("travel_style"),
        }))
    }

    async fn upsert_preferences(
        &self,
        user_id: &str,
        preferences: TravelerPreferences,
    ) -> Result<()> {
        let interests_json = serde_json::to_string(&preferences.interests)?;

        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, budget, interests_json, travel_style)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
              budget=excluded.budget,
              interests_json=excluded.interests_json,
              travel_style=excluded.travel_style
            "#,
        )
        .bind(user_id)
        .bind(preferences.budget)
        .bind(interests_json)
        .bind(&preferences.travel_style)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl InterestMappingRepository for SqliteStore {
    async fn interest_mappings(&self, provider: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let rows = sqlx::query(
            r#"
            SELECT name, providers_json
            FROM interest_mappings
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mappings = rows
            .into_iter()
            .map(|row| {
                let providers_json: String = row.get("providers_json");
                InterestMapping {
                    name: row.get("name"),
                    providers: serde_json::from_str(&providers_json).unwrap_or_default(),
                }
            })
            .collect::<Vec<_>>();

        Ok(project_mappings(&mappings, provider))
    }

    async fn upsert_interest_mapping(&self, mapping: InterestMapping) -> Result<()> {
        let providers_json = serde_json::to_string(&mapping.providers)?;

        sqlx::query(
            r#"
            INSERT INTO interest_mappings (name, providers_json)
            VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET
              providers_json=excluded.providers_json
            "#,
        )
        .bind(&mapping.name)
        .bind(providers_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }
}

impl PlaceCatalog for Store {
    async fn places_in_city(&self, city: &str) -> Result<Vec<Place>> {
        match self {
            Store::Memory(store) => store.places_in_city(city).await,
            Store::Sqlite(store) => store.places_in_city(city).await,
        }
    }

    async fn upsert_place(&self, place: Place) -> Result<()> {
        match self {
            Store::Memory(store) => store.upsert_place(place).await,
            Store::Sqlite(store) => store.upsert_place(place).await,
        }
    }
}

impl PreferenceRepository for Store {
    async fn load_preferences(&self, user_id: &str) -> Result<Option<TravelerPreferences>> {
        match self {
            Store::Memory(store) => store.load_preferences(user_id).await,
            Store::Sqlite(store) => store.load_preferences(user_id).await,
        }
    }

    async fn upsert_preferences(
        &self,
        user_id: &str,
        preferences: TravelerPreferences,
    ) -> Result<()> {
        match self {
            Store::Memory(store) => store.upsert_preferences(user_id, preferences).await,
            Store::Sqlite(store) => store.upsert_preferences(user_id, preferences).await,
        }
    }
}

impl InterestMappingRepository for Store {
    async fn interest_mappings(&self, provider: &str) -> Result<BTreeMap<String, Vec<String>>> {
        match self {
            Store::Memory(store) => store.interest_mappings(provider).await,
            Store::Sqlite(store) => store.interest_mappings(provider).await,
        }
    }

    async fn upsert_interest_mapping(&self, mapping: InterestMapping) -> Result<()> {
        match self {
            Store::Memory(store) => store.upsert_interest_mapping(mapping).await,
            Store::Sqlite(store) => store.upsert_interest_mapping(mapping).await,
        }
    }
}
