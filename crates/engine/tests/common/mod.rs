#![allow(dead_code)]

use sea_orm::Database;
use uuid::Uuid;

use engine::{Child, CreditCmd, Engine, MoneyCents, NewChildCmd, SavingsTransfer, UserRole};
use migration::MigratorTrait;

pub const PARENT: &str = "alice";
pub const OTHER_PARENT: &str = "mallory";
pub const KID: &str = "cleo";

pub struct Family {
    pub engine: Engine,
    pub family_id: Uuid,
    pub child: Child,
}

/// A migrated in-memory engine with one family: `alice` as parent, a child
/// linked to the `cleo` login, and an unrelated parent `mallory`.
pub async fn family_with(weekly_allowance: i64, transfer: SavingsTransfer) -> Family {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let family_id = engine.create_family("Rossi").await.unwrap();
    engine
        .create_user(PARENT, "password", UserRole::Parent, Some(family_id))
        .await
        .unwrap();
    let other_family = engine.create_family("Bianchi").await.unwrap();
    engine
        .create_user(OTHER_PARENT, "password", UserRole::Parent, Some(other_family))
        .await
        .unwrap();

    let child = engine
        .create_child(
            NewChildCmd::new(PARENT, "Cleo", MoneyCents::new(weekly_allowance))
                .savings_transfer(transfer),
        )
        .await
        .unwrap();
    engine
        .create_user(KID, "password", UserRole::Child, Some(family_id))
        .await
        .unwrap();
    engine.link_child_user(child.id, KID, PARENT).await.unwrap();
    let child = engine.child(child.id, PARENT).await.unwrap();

    Family {
        engine,
        family_id,
        child,
    }
}

pub async fn family() -> Family {
    family_with(10_00, SavingsTransfer::None).await
}

/// Credits the spending balance of the child as the parent.
pub async fn fund(family: &Family, cents: i64) {
    family
        .engine
        .record_credit(CreditCmd::new(
            family.child.id,
            PARENT,
            MoneyCents::new(cents),
            "Chores",
        ))
        .await
        .unwrap();
}
