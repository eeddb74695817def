//! Display metadata per strategy

use serde::Serialize;
use crate::strategy::Strategy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StrategyInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

const CATALOG: [StrategyInfo; 6] = [
    StrategyInfo {
        id: "cooperator",
        name: "Always Cooperate",
        description: "This naive optimist always cooperates, trusting everyone no matter what.",
        icon: "😊",
    },
    StrategyInfo {
        id: "defector",
        name: "Always Cheat",
        description: "This cynical exploiter always defects, never trusting anyone.",
        icon: "😈",
    },
    StrategyInfo {
        id: "tit-for-tat",
        name: "Tit for Tat",
        description: "This reciprocator starts with cooperation, then mirrors your last move.",
        icon: "🔄",
    },
    StrategyInfo {
        id: "grudger",
        name: "Grudger",
        description: "This agent cooperates until you defect once, then holds a grudge forever.",
        icon: "😤",
    },
    StrategyInfo {
        id: "random",
        name: "Random",
        description: "This unpredictable agent has a 50% chance of cooperating each round.",
        icon: "🎲",
    },
    StrategyInfo {
        id: "detective",
        name: "Detective",
        description: "This clever agent tests you first, then adapts based on your responses.",
        icon: "🕵️",
    },
];

impl Strategy {
    /// Catalog entry for this strategy
    pub fn info(self) -> &'static StrategyInfo {
        &CATALOG[self.index()]
    }
}

/// The whole catalog, in `Strategy::ALL` order
pub fn catalog() -> &'static [StrategyInfo] {
    &CATALOG
}
