//! Style technical database ("tech pack") domain model.
//!
//! A style's tech pack maps `(category, field)` keys to instruction nodes.
//! A node is either a single global instruction or a set of color variants,
//! and each color variant carries either leaf content or a further split into
//! size sub-variants. Leaves are the deepest level; there is no nesting below
//! a size sub-variant.

pub mod attachment;
pub mod blueprint;
pub mod node;
pub mod rule;

pub use attachment::{Attachment, AttachmentKind};
pub use blueprint::{
    STANDARD_SIZES, StyleBlueprint, TemplateCategory, TemplateConfig, sort_sizes,
};
pub use node::{ColorVariant, FieldKey, InstructionContent, InstructionNode, SizeSubVariant, TechPack, VariantBody};
pub use rule::{ConsumptionMethod, ConsumptionRule};
