//! Seed the database with a demo template, style, and order.
//!
//! # Usage
//!
//! ```bash
//! sw-cli seed
//! ```

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use stitchworks_admin::db::orders::OrderRepository;
use stitchworks_admin::db::styles::StyleRepository;
use stitchworks_admin::db::{self, RepositoryError, template};
use stitchworks_admin::models::order::CreateOrderInput;
use stitchworks_admin::models::style::CreateStyleInput;
use stitchworks_core::order::{OrderQuantityMatrix, QuantityRow, SizeFormat};
use stitchworks_core::techpack::{
    ColorVariant, ConsumptionMethod, ConsumptionRule, FieldKey, InstructionContent,
    InstructionNode, TechPack, TemplateCategory, TemplateConfig, VariantBody,
};

/// Errors that can occur seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Seed a demo template, one style with a populated tech pack, and one
/// draft order against it.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or a write fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = SecretString::from(
        std::env::var("ADMIN_DATABASE_URL")
            .map_err(|_| SeedError::MissingEnvVar("ADMIN_DATABASE_URL"))?,
    );
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Seeding template config...");
    template::set_template(&pool, &demo_template()).await?;

    tracing::info!("Seeding demo style...");
    let style = StyleRepository::new(&pool)
        .create(&CreateStyleInput {
            style_number: "SW-2301".to_string(),
            available_colors: vec!["Red".to_string(), "Blue".to_string()],
            available_sizes: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            tech_pack: demo_tech_pack(),
        })
        .await?;

    tracing::info!("Seeding demo order...");
    let order = OrderRepository::new(&pool)
        .create(&CreateOrderInput {
            order_number: "PO-0001".to_string(),
            style_id: style.blueprint.id,
            quantities: OrderQuantityMatrix(vec![
                QuantityRow::new("Red", &[("S", 10), ("M", 10)]),
                QuantityRow::new("Blue", &[("S", 5), ("L", 5)]),
            ]),
            size_format: SizeFormat::Standard,
            notes: Some("Seeded demo order".to_string()),
        })
        .await?;

    tracing::info!(style_id = %style.blueprint.id, order_id = %order.id, "Seed complete!");
    Ok(())
}

fn demo_template() -> TemplateConfig {
    TemplateConfig(vec![
        TemplateCategory {
            name: "Fabric".to_string(),
            fields: vec!["Shell".to_string(), "Lining".to_string()],
        },
        TemplateCategory {
            name: "Trims".to_string(),
            fields: vec!["Zipper".to_string(), "Label".to_string(), "Thread".to_string()],
        },
    ])
}

fn demo_tech_pack() -> TechPack {
    let mut pack = TechPack::new();

    // Color-scoped zipper with a per-garment ratio.
    pack.insert(
        FieldKey::new("Trims", "Zipper"),
        InstructionNode::Variants(vec![ColorVariant {
            colors: vec!["Red".to_string()],
            body: VariantBody::Leaf(InstructionContent {
                text: "YKK #5, dyed to match".to_string(),
                attachments: Vec::new(),
                consumption_rule: Some(ConsumptionRule::new(
                    ConsumptionMethod::ItemsPerUnit,
                    Decimal::ONE,
                )),
            }),
        }]),
    );

    // Order-wide label rule: one roll covers 50 garments.
    pack.insert(
        FieldKey::new("Trims", "Label"),
        InstructionNode::Global(InstructionContent {
            text: "Woven main label, center back".to_string(),
            attachments: Vec::new(),
            consumption_rule: Some(ConsumptionRule::new(
                ConsumptionMethod::UnitsPerItem,
                Decimal::from(50),
            )),
        }),
    );

    // Descriptive-only field: no rule, no forecast contribution.
    pack.insert(
        FieldKey::new("Fabric", "Shell"),
        InstructionNode::Global(InstructionContent::text_only(
            "240gsm French terry, pre-shrunk",
        )),
    );

    pack
}
