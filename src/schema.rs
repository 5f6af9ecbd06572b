/// diesel table for categories
table! {
    categories (id) {
        id -> Integer,
        name -> VarChar,
        description -> VarChar,
        slug -> VarChar,
        icon -> Nullable<VarChar>,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

/// diesel table for subcategories
table! {
    subcategories (id) {
        id -> Integer,
        category_id -> Integer,
        name -> VarChar,
        description -> VarChar,
        is_active -> Bool,
    }
}

/// diesel table for attribute definitions of a category
table! {
    attribute_definitions (id) {
        id -> Integer,
        category_id -> Integer,
        name -> VarChar,
        value_type -> VarChar,
        options -> Jsonb,
        required -> Bool,
        description -> Nullable<VarChar>,
    }
}

/// diesel table for businesses
table! {
    businesses (id) {
        id -> Integer,
        user_id -> Integer,
        name -> VarChar,
        slug -> VarChar,
        description -> VarChar,
        price_range -> Integer,
        category_id -> Integer,
        subcategory_id -> Nullable<Integer>,
        address -> VarChar,
        city -> VarChar,
        state -> VarChar,
        zip_code -> VarChar,
        phone -> Nullable<VarChar>,
        email -> Nullable<VarChar>,
        website -> Nullable<VarChar>,
        hours -> Jsonb,
        social_media -> Jsonb,
        images -> Jsonb,
        additional_info -> Nullable<VarChar>,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

/// diesel table for attribute values of a business
table! {
    business_attributes (id) {
        id -> Integer,
        business_id -> Integer,
        attribute_id -> Integer,
        value -> Jsonb,
    }
}

joinable!(subcategories -> categories (category_id));
joinable!(attribute_definitions -> categories (category_id));
joinable!(businesses -> categories (category_id));
joinable!(business_attributes -> businesses (business_id));
joinable!(business_attributes -> attribute_definitions (attribute_id));

allow_tables_to_appear_in_same_query!(categories, subcategories, attribute_definitions, businesses, business_attributes);
