//! Shadow traffic: spot test statements and send them to the shadow datasource.

pub mod condition;
pub mod decorator;
pub mod judgement;

pub use condition::{
    EqualShadowCondition, ShadowCondition, ShadowConditionEngine, ShadowConditionProvider,
};
pub use decorator::ShadowRouteDecorator;
pub use judgement::{ShadowJudgementEngine, SimpleJudgementEngine, is_shadow_sql};
