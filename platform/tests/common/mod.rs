//! Shared harness for facade and HTTP tests.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use std::sync::Arc;
use webnovel_core::calendar::WeekCalendar;
use webnovel_core::environment::Clock;
use webnovel_core::store::{Database, Transaction};
use webnovel_core::types::{Episode, PriceType, Product, Role};
use webnovel_platform::Platform;
use webnovel_testing::fixtures::{self, Account};
use webnovel_testing::{InMemoryDatabase, InMemoryTransaction, MockClock};

/// Monday 2025-01-06 10:00 KST.
pub const MONDAY_MORNING: &str = "2025-01-06T01:00:00Z";

pub struct Harness {
    pub db: InMemoryDatabase,
    pub clock: MockClock,
    pub platform: Platform<InMemoryDatabase>,
}

impl Harness {
    pub fn at(rfc3339: &str) -> Self {
        let db = InMemoryDatabase::new();
        let clock = MockClock::at(rfc3339);
        let platform = Platform::new(
            Arc::new(db.clone()),
            Arc::new(clock.clone()),
            WeekCalendar::default(),
        );
        Self {
            db,
            clock,
            platform,
        }
    }

    pub fn new() -> Self {
        Self::at(MONDAY_MORNING)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn tx(&self) -> InMemoryTransaction {
        self.db.begin().await.unwrap()
    }

    pub async fn account(&self, subject: &str, role: Role) -> Account {
        let mut tx = self.tx().await;
        let account = fixtures::account(&mut tx, subject, role, self.now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        account
    }

    pub async fn reader(&self, subject: &str) -> Account {
        self.account(subject, Role::User).await
    }

    pub async fn credit(&self, account: &Account, amount: i64) {
        let mut tx = self.tx().await;
        fixtures::credit(&mut tx, account.user.id, amount, self.now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
    }

    /// A product by a fresh author with `paid` paid and `free` free episodes,
    /// free ones first.
    pub async fn work(&self, author: &str, free: usize, paid: usize) -> Work {
        let mut tx = self.tx().await;
        let author = fixtures::author(&mut tx, author, self.now()).await.unwrap();
        let product = fixtures::product(&mut tx, author.user.id, "The Returner", self.now())
            .await
            .unwrap();
        let mut episodes = Vec::new();
        for _ in 0..free {
            episodes.push(
                fixtures::open_episode(&mut tx, &product, PriceType::Free, self.now())
                    .await
                    .unwrap(),
            );
        }
        episodes.extend(
            fixtures::paid_episodes(&mut tx, &product, paid, self.now())
                .await
                .unwrap(),
        );
        tx.commit().await.unwrap();
        Work {
            author,
            product,
            episodes,
        }
    }
}

pub struct Work {
    pub author: Account,
    pub product: Product,
    pub episodes: Vec<Episode>,
}

impl Work {
    pub fn paid(&self) -> Vec<&Episode> {
        self.episodes
            .iter()
            .filter(|e| e.price_type == PriceType::Paid)
            .collect()
    }
}
