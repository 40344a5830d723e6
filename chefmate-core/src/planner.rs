//! Weekly meal planner.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::types::VariantKind;

/// Days in a plan.
pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealSlot {
    pub const ALL: &'static [MealSlot] = &[MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    /// Order in which free slots are filled.
    pub const FILL_ORDER: &'static [MealSlot] =
        &[MealSlot::Dinner, MealSlot::Lunch, MealSlot::Breakfast];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealSlot::Breakfast),
            "lunch" => Some(MealSlot::Lunch),
            "dinner" => Some(MealSlot::Dinner),
            _ => None,
        }
    }

    /// German display label.
    pub fn label(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Frühstück",
            MealSlot::Lunch => "Mittagessen",
            MealSlot::Dinner => "Abendessen",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recipe variant scheduled for a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PlannedMeal {
    pub recipe_id: Uuid,
    pub version: VariantKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DaySlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakfast: Option<PlannedMeal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lunch: Option<PlannedMeal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinner: Option<PlannedMeal>,
}

impl DaySlots {
    pub fn get(&self, slot: MealSlot) -> Option<&PlannedMeal> {
        self.slot_ref(slot).as_ref()
    }

    fn slot_ref(&self, slot: MealSlot) -> &Option<PlannedMeal> {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    fn slot_mut(&mut self, slot: MealSlot) -> &mut Option<PlannedMeal> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// First empty slot in fill order.
    pub fn first_free(&self) -> Option<MealSlot> {
        MealSlot::FILL_ORDER
            .iter()
            .copied()
            .find(|slot| self.get(*slot).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PlannerDay {
    /// Serialized as YYYY-MM-DD.
    pub date: NaiveDate,
    pub slots: DaySlots,
}

/// Where `add_meal` put a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub day_index: usize,
    pub date: NaiveDate,
    pub slot: MealSlot,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Tag {0} ist voll")]
    DayFull(NaiveDate),

    #[error("Day index {0} is outside the week")]
    DayOutOfRange(usize),
}

/// Seven consecutive days starting on a Monday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct WeekPlan {
    pub days: Vec<PlannerDay>,
}

impl WeekPlan {
    /// Empty plan for the week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
        let days = (0..DAYS_PER_WEEK as i64)
            .map(|offset| PlannerDay {
                date: monday + Duration::days(offset),
                slots: DaySlots::default(),
            })
            .collect();

        Self { days }
    }

    /// Empty plan for the current (UTC) week.
    pub fn current() -> Self {
        Self::week_of(Utc::now().date_naive())
    }

    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.days.iter().position(|day| day.date == date)
    }

    /// Schedule a meal on `today`, or on the first day if `today` is outside the week.
    pub fn add_meal(
        &mut self,
        today: NaiveDate,
        recipe_id: Uuid,
        version: VariantKind,
    ) -> Result<Placement, PlannerError> {
        let day_index = self.day_index(today).unwrap_or(0);
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(PlannerError::DayOutOfRange(day_index))?;

        let slot = day.slots.first_free().ok_or(PlannerError::DayFull(day.date))?;
        *day.slots.slot_mut(slot) = Some(PlannedMeal { recipe_id, version });

        tracing::debug!(date = %day.date, slot = %slot, recipe_id = %recipe_id, "Meal planned");

        Ok(Placement {
            day_index,
            date: day.date,
            slot,
        })
    }

    /// Clear a slot, returning what was in it.
    pub fn remove_meal(
        &mut self,
        day_index: usize,
        slot: MealSlot,
    ) -> Result<Option<PlannedMeal>, PlannerError> {
        let day = self
            .days
            .get_mut(day_index)
            .ok_or(PlannerError::DayOutOfRange(day_index))?;

        Ok(day.slots.slot_mut(slot).take())
    }

    /// Number of planned meals across the week.
    pub fn meal_count(&self) -> usize {
        self.days
            .iter()
            .map(|day| {
                MealSlot::ALL
                    .iter()
                    .filter(|slot| day.slots.get(**slot).is_some())
                    .count()
            })
            .sum()
    }
}
