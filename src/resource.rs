//! Resource catalogue: every table exposed over HTTP, its path segment and its columns.
//! Column names are the camelCase wire names; the snake_case column is derived.

use crate::case::to_snake_case;
use std::fmt;

/// Columns managed by the storage layer on every table. Clients may read but never write them.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Allergy,
    Category,
    DietPreference,
    Household,
    InventoryItem,
    MealPlan,
    MealPlanRecipe,
    Product,
    Recipe,
    RecipeIngredient,
    ShoppingList,
    ShoppingListItem,
    StorageLocation,
    UserAllergy,
    UserDietPreference,
}

/// A PostgreSQL enum type.
#[derive(Debug, PartialEq, Eq)]
pub struct PgEnum {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

pub const DAY_OF_WEEK: PgEnum = PgEnum {
    name: "day_of_week",
    values: &[
        "MONDAY",
        "TUESDAY",
        "WEDNESDAY",
        "THURSDAY",
        "FRIDAY",
        "SATURDAY",
        "SUNDAY",
    ],
};

pub const MEAL_TYPE: PgEnum = PgEnum {
    name: "meal_type",
    values: &["BREAKFAST", "LUNCH", "DINNER", "SNACK"],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    /// double precision
    Float,
    Boolean,
    /// timestamptz, ISO-8601 on the wire
    Timestamp,
    Enum(&'static PgEnum),
}

impl ColumnKind {
    /// Type used in `$n::type` casts; values are always bound as text.
    pub fn pg_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "double precision",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Timestamp => "timestamptz",
            ColumnKind::Enum(e) => e.name,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    /// Wire name (camelCase).
    pub name: &'static str,
    pub kind: ColumnKind,
    /// NOT NULL without a default: must be present on insert.
    pub required: bool,
    /// Foreign key target (always that resource's `id`).
    pub references: Option<Resource>,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Column {
            name,
            kind,
            required: false,
            references: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn references(mut self, target: Resource) -> Self {
        self.references = Some(target);
        self
    }

    /// PostgreSQL column name.
    pub fn column_name(&self) -> String {
        to_snake_case(self.name)
    }
}

const fn text(name: &'static str) -> Column {
    Column::new(name, ColumnKind::Text)
}

const fn foreign_key(name: &'static str, target: Resource) -> Column {
    Column::new(name, ColumnKind::Text).required().references(target)
}

const NAME_AND_DESCRIPTION: &[Column] = &[text("name").required(), text("description")];

const HOUSEHOLD: &[Column] = &[text("name").required()];

const INVENTORY_ITEM: &[Column] = &[
    Column::new("quantity", ColumnKind::Float).required(),
    text("unit").required(),
    Column::new("expiryDate", ColumnKind::Timestamp),
    foreign_key("storageLocationId", Resource::StorageLocation),
    foreign_key("productId", Resource::Product),
];

const MEAL_PLAN: &[Column] = &[
    text("name").required(),
    Column::new("startDate", ColumnKind::Timestamp).required(),
    Column::new("endDate", ColumnKind::Timestamp).required(),
    foreign_key("householdId", Resource::Household),
];

const MEAL_PLAN_RECIPE: &[Column] = &[
    foreign_key("mealPlanId", Resource::MealPlan),
    foreign_key("recipeId", Resource::Recipe),
    Column::new("dayOfWeek", ColumnKind::Enum(&DAY_OF_WEEK)).required(),
    Column::new("mealType", ColumnKind::Enum(&MEAL_TYPE)).required(),
    text("notes"),
];

const PRODUCT: &[Column] = &[
    text("name").required(),
    text("description"),
    text("brand"),
    text("barcode"),
    foreign_key("categoryId", Resource::Category),
];

const RECIPE: &[Column] = &[
    text("name").required(),
    text("description"),
    text("instructions").required(),
    Column::new("prepTime", ColumnKind::Integer).required(),
    Column::new("cookTime", ColumnKind::Integer).required(),
    Column::new("servings", ColumnKind::Integer).required(),
];

const RECIPE_INGREDIENT: &[Column] = &[
    foreign_key("recipeId", Resource::Recipe),
    foreign_key("productId", Resource::Product),
    Column::new("quantity", ColumnKind::Float).required(),
    text("unit").required(),
    text("notes"),
];

const SHOPPING_LIST: &[Column] = &[
    text("name").required(),
    foreign_key("householdId", Resource::Household),
];

const SHOPPING_LIST_ITEM: &[Column] = &[
    foreign_key("shoppingListId", Resource::ShoppingList),
    foreign_key("productId", Resource::Product),
    Column::new("quantity", ColumnKind::Float).required(),
    text("unit").required(),
    // defaults to false
    Column::new("isChecked", ColumnKind::Boolean),
    text("notes"),
];

const STORAGE_LOCATION: &[Column] = &[
    text("name").required(),
    text("description"),
    foreign_key("householdId", Resource::Household),
];

// Users live outside this service, so userId carries no foreign key.
const USER_ALLERGY: &[Column] = &[
    text("userId").required(),
    foreign_key("allergyId", Resource::Allergy),
];

const USER_DIET_PREFERENCE: &[Column] = &[
    text("userId").required(),
    foreign_key("dietPreferenceId", Resource::DietPreference),
];

impl Resource {
    pub const ALL: [Resource; 15] = [
        Resource::Allergy,
        Resource::Category,
        Resource::DietPreference,
        Resource::Household,
        Resource::InventoryItem,
        Resource::MealPlan,
        Resource::MealPlanRecipe,
        Resource::Product,
        Resource::Recipe,
        Resource::RecipeIngredient,
        Resource::ShoppingList,
        Resource::ShoppingListItem,
        Resource::StorageLocation,
        Resource::UserAllergy,
        Resource::UserDietPreference,
    ];

    /// Path segment under `/api`.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Allergy => "allergies",
            Resource::Category => "categories",
            Resource::DietPreference => "diet-preferences",
            Resource::Household => "households",
            Resource::InventoryItem => "inventory-items",
            Resource::MealPlan => "meal-plans",
            Resource::MealPlanRecipe => "meal-plan-recipes",
            Resource::Product => "products",
            Resource::Recipe => "recipes",
            Resource::RecipeIngredient => "recipe-ingredients",
            Resource::ShoppingList => "shopping-lists",
            Resource::ShoppingListItem => "shopping-list-items",
            Resource::StorageLocation => "storage-locations",
            Resource::UserAllergy => "user-allergies",
            Resource::UserDietPreference => "user-diet-preferences",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            Resource::Allergy => "allergies",
            Resource::Category => "categories",
            Resource::DietPreference => "diet_preferences",
            Resource::Household => "households",
            Resource::InventoryItem => "inventory_items",
            Resource::MealPlan => "meal_plans",
            Resource::MealPlanRecipe => "meal_plan_recipes",
            Resource::Product => "products",
            Resource::Recipe => "recipes",
            Resource::RecipeIngredient => "recipe_ingredients",
            Resource::ShoppingList => "shopping_lists",
            Resource::ShoppingListItem => "shopping_list_items",
            Resource::StorageLocation => "storage_locations",
            Resource::UserAllergy => "user_allergies",
            Resource::UserDietPreference => "user_diet_preferences",
        }
    }

    /// Human-readable singular name, e.g. "meal plan recipe".
    pub fn singular(self) -> &'static str {
        match self {
            Resource::Allergy => "allergy",
            Resource::Category => "category",
            Resource::DietPreference => "diet preference",
            Resource::Household => "household",
            Resource::InventoryItem => "inventory item",
            Resource::MealPlan => "meal plan",
            Resource::MealPlanRecipe => "meal plan recipe",
            Resource::Product => "product",
            Resource::Recipe => "recipe",
            Resource::RecipeIngredient => "recipe ingredient",
            Resource::ShoppingList => "shopping list",
            Resource::ShoppingListItem => "shopping list item",
            Resource::StorageLocation => "storage location",
            Resource::UserAllergy => "user allergy",
            Resource::UserDietPreference => "user diet preference",
        }
    }

    /// Human-readable plural name, e.g. "allergies".
    pub fn plural(self) -> String {
        self.path().replace('-', " ")
    }

    /// OpenAPI tag, e.g. "Shopping List Items".
    pub fn tag(self) -> String {
        self.path()
            .split('-')
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn columns(self) -> &'static [Column] {
        match self {
            Resource::Allergy | Resource::Category | Resource::DietPreference => {
                NAME_AND_DESCRIPTION
            }
            Resource::Household => HOUSEHOLD,
            Resource::InventoryItem => INVENTORY_ITEM,
            Resource::MealPlan => MEAL_PLAN,
            Resource::MealPlanRecipe => MEAL_PLAN_RECIPE,
            Resource::Product => PRODUCT,
            Resource::Recipe => RECIPE,
            Resource::RecipeIngredient => RECIPE_INGREDIENT,
            Resource::ShoppingList => SHOPPING_LIST,
            Resource::ShoppingListItem => SHOPPING_LIST_ITEM,
            Resource::StorageLocation => STORAGE_LOCATION,
            Resource::UserAllergy => USER_ALLERGY,
            Resource::UserDietPreference => USER_DIET_PREFERENCE,
        }
    }

    pub fn column(self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Columns of other resources holding a foreign key to this one.
    pub fn referenced_by(self) -> impl Iterator<Item = (Resource, &'static Column)> {
        Resource::ALL.into_iter().flat_map(move |owner| {
            owner
                .columns()
                .iter()
                .filter(move |c| c.references == Some(self))
                .map(move |c| (owner, c))
        })
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
