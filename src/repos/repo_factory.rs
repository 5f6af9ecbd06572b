use diesel::connection::AnsiTransactionManager;
use diesel::pg::Pg;
use diesel::Connection;

use repos::*;

pub trait ReposFactory<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static>: Clone + Send + 'static {
    fn create_categories_repo<'a>(&self, db_conn: &'a C) -> Box<CategoriesRepo + 'a>;
    fn create_subcategories_repo<'a>(&self, db_conn: &'a C) -> Box<SubcategoriesRepo + 'a>;
    fn create_attribute_definitions_repo<'a>(&self, db_conn: &'a C) -> Box<AttributeDefinitionsRepo + 'a>;
    fn create_businesses_repo<'a>(&self, db_conn: &'a C) -> Box<BusinessesRepo + 'a>;
    fn create_business_attributes_repo<'a>(&self, db_conn: &'a C) -> Box<BusinessAttributesRepo + 'a>;
}

#[derive(Clone, Default)]
pub struct ReposFactoryImpl;

impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryImpl {
    fn create_categories_repo<'a>(&self, db_conn: &'a C) -> Box<CategoriesRepo + 'a> {
        Box::new(CategoriesRepoImpl::new(db_conn)) as Box<CategoriesRepo>
    }
    fn create_subcategories_repo<'a>(&self, db_conn: &'a C) -> Box<SubcategoriesRepo + 'a> {
        Box::new(SubcategoriesRepoImpl::new(db_conn)) as Box<SubcategoriesRepo>
    }
    fn create_attribute_definitions_repo<'a>(&self, db_conn: &'a C) -> Box<AttributeDefinitionsRepo + 'a> {
        Box::new(AttributeDefinitionsRepoImpl::new(db_conn)) as Box<AttributeDefinitionsRepo>
    }
    fn create_businesses_repo<'a>(&self, db_conn: &'a C) -> Box<BusinessesRepo + 'a> {
        Box::new(BusinessesRepoImpl::new(db_conn)) as Box<BusinessesRepo>
    }
    fn create_business_attributes_repo<'a>(&self, db_conn: &'a C) -> Box<BusinessAttributesRepo + 'a> {
        Box::new(BusinessAttributesRepoImpl::new(db_conn)) as Box<BusinessAttributesRepo>
    }
}

#[cfg(test)]
pub mod tests {

    use std::error::Error;
    use std::fmt;
    use std::sync::Arc;
    use std::time::SystemTime;

    use diesel::connection::AnsiTransactionManager;
    use diesel::connection::SimpleConnection;
    use diesel::deserialize::QueryableByName;
    use diesel::pg::Pg;
    use diesel::query_builder::AsQuery;
    use diesel::query_builder::QueryFragment;
    use diesel::query_builder::QueryId;
    use diesel::sql_types::HasSqlType;
    use diesel::Connection;
    use diesel::ConnectionResult;
    use diesel::QueryResult;
    use diesel::Queryable;
    use futures_cpupool::CpuPool;
    use r2d2;
    use r2d2::ManageConnection;

    use config::Config;
    use controller::context::*;
    use models::*;
    use repos::*;
    use services::*;

    pub const MOCK_REPO_FACTORY: ReposFactoryMock = ReposFactoryMock {};
    /// Listed as admin in `config/base.toml`
    pub static MOCK_USER_ID: UserId = UserId(1);
    pub static MOCK_OTHER_USER_ID: UserId = UserId(2);
    pub static MOCK_CATEGORY_ID: CategoryId = CategoryId(1);
    pub static MOCK_MISSING_CATEGORY_ID: CategoryId = CategoryId(404);
    pub static MOCK_SUBCATEGORY_ID: SubcategoryId = SubcategoryId(1);
    pub static MOCK_CUISINE_ATTRIBUTE_ID: AttributeId = AttributeId(1);
    pub static MOCK_DELIVERY_ATTRIBUTE_ID: AttributeId = AttributeId(2);
    pub static MOCK_BUSINESS_ID: BusinessId = BusinessId(1);
    pub static MOCK_MISSING_BUSINESS_ID: BusinessId = BusinessId(404);
    pub static MOCK_CATEGORY_SLUG_EXISTED: &'static str = "restaurant";
    pub static MOCK_BUSINESS_NAME_EXISTED: &'static str = "Taken Diner";

    pub fn create_service(user_id: Option<UserId>) -> Service<MockConnection, MockConnectionManager, ReposFactoryMock> {
        let manager = MockConnectionManager::default();
        let db_pool = r2d2::Pool::builder().build(manager).expect("Failed to create connection pool");
        let cpu_pool = CpuPool::new(1);

        let config = Config::new().unwrap();
        let static_context = StaticContext::new(db_pool, cpu_pool, Arc::new(config), MOCK_REPO_FACTORY);
        let dynamic_context = DynamicContext::new(user_id);

        Service::new(static_context, dynamic_context)
    }

    pub fn create_category(category_id: CategoryId) -> Category {
        Category {
            id: category_id,
            name: "Restaurant".to_string(),
            description: "Places to eat".to_string(),
            slug: MOCK_CATEGORY_SLUG_EXISTED.to_string(),
            icon: None,
            is_active: true,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    pub fn create_subcategory(subcategory_id: SubcategoryId, category_id: CategoryId) -> Subcategory {
        Subcategory {
            id: subcategory_id,
            category_id,
            name: "Pizzeria".to_string(),
            description: "Pizza places".to_string(),
            is_active: true,
        }
    }

    pub fn create_cuisine_attribute(category_id: CategoryId) -> AttributeDefinition {
        AttributeDefinition {
            id: MOCK_CUISINE_ATTRIBUTE_ID,
            category_id,
            name: "Cuisine".to_string(),
            value_type: AttributeType::MultiSelect,
            options: vec!["Italian".to_string(), "Thai".to_string(), "Mexican".to_string()],
            required: true,
            description: None,
        }
    }

    pub fn create_delivery_attribute(category_id: CategoryId) -> AttributeDefinition {
        AttributeDefinition {
            id: MOCK_DELIVERY_ATTRIBUTE_ID,
            category_id,
            name: "Delivery".to_string(),
            value_type: AttributeType::Boolean,
            options: vec![],
            required: false,
            description: Some("Delivers to your door".to_string()),
        }
    }

    pub fn create_raw_business(business_id: BusinessId, user_id: UserId) -> RawBusiness {
        RawBusiness {
            id: business_id,
            user_id,
            name: "Joe's Diner".to_string(),
            slug: "joe-s-diner".to_string(),
            description: "Classic diner food all day long".to_string(),
            price_range: 2,
            category_id: MOCK_CATEGORY_ID,
            subcategory_id: None,
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: None,
            email: None,
            website: None,
            hours: json!(BusinessHours::default_week()),
            social_media: json!([]),
            images: json!([]),
            additional_info: None,
            is_active: true,
            created_at: SystemTime::now(),
            updated_at: SystemTime::now(),
        }
    }

    pub fn create_business_payload() -> BusinessPayload {
        BusinessPayload {
            name: "Joe's Diner".to_string(),
            description: "Classic diner food all day long".to_string(),
            price_range: 2,
            category_id: MOCK_CATEGORY_ID,
            subcategory_id: Some(MOCK_SUBCATEGORY_ID),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone: Some("+1 (555) 123-4567".to_string()),
            email: Some("joe@example.com".to_string()),
            website: None,
            hours: BusinessHours::default_week(),
            social_media: vec![],
            images: vec![],
            additional_info: None,
            attributes: vec![AttributeValuePayload {
                attribute_id: MOCK_CUISINE_ATTRIBUTE_ID,
                value: json!(["Thai"]),
            }],
        }
    }

    #[derive(Default, Copy, Clone)]
    pub struct ReposFactoryMock;

    impl<C: Connection<Backend = Pg, TransactionManager = AnsiTransactionManager> + 'static> ReposFactory<C> for ReposFactoryMock {
        fn create_categories_repo<'a>(&self, _db_conn: &'a C) -> Box<CategoriesRepo + 'a> {
            Box::new(CategoriesRepoMock::default()) as Box<CategoriesRepo>
        }
        fn create_subcategories_repo<'a>(&self, _db_conn: &'a C) -> Box<SubcategoriesRepo + 'a> {
            Box::new(SubcategoriesRepoMock::default()) as Box<SubcategoriesRepo>
        }
        fn create_attribute_definitions_repo<'a>(&self, _db_conn: &'a C) -> Box<AttributeDefinitionsRepo + 'a> {
            Box::new(AttributeDefinitionsRepoMock::default()) as Box<AttributeDefinitionsRepo>
        }
        fn create_businesses_repo<'a>(&self, _db_conn: &'a C) -> Box<BusinessesRepo + 'a> {
            Box::new(BusinessesRepoMock::default()) as Box<BusinessesRepo>
        }
        fn create_business_attributes_repo<'a>(&self, _db_conn: &'a C) -> Box<BusinessAttributesRepo + 'a> {
            Box::new(BusinessAttributesRepoMock::default()) as Box<BusinessAttributesRepo>
        }
    }

    #[derive(Clone, Default)]
    pub struct CategoriesRepoMock;

    impl CategoriesRepo for CategoriesRepoMock {
        fn find(&self, category_id: CategoryId) -> RepoResult<Option<Category>> {
            if category_id == MOCK_MISSING_CATEGORY_ID {
                Ok(None)
            } else {
                Ok(Some(create_category(category_id)))
            }
        }

        fn list(&self, _with_inactive: bool) -> RepoResult<Vec<Category>> {
            Ok(vec![create_category(MOCK_CATEGORY_ID)])
        }

        fn create(&self, payload: NewCategory) -> RepoResult<Category> {
            Ok(Category {
                id: CategoryId(2),
                name: payload.name,
                description: payload.description,
                slug: payload.slug,
                icon: payload.icon,
                is_active: true,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            })
        }

        fn update(&self, category_id: CategoryId, payload: UpdateCategory) -> RepoResult<Category> {
            let mut category = create_category(category_id);
            if let Some(name) = payload.name {
                category.name = name;
            }
            if let Some(slug) = payload.slug {
                category.slug = slug;
            }
            Ok(category)
        }

        fn deactivate(&self, category_id: CategoryId) -> RepoResult<Category> {
            let mut category = create_category(category_id);
            category.is_active = false;
            Ok(category)
        }

        fn slug_exists(&self, slug: String, _exclude: Option<CategoryId>) -> RepoResult<bool> {
            Ok(slug == MOCK_CATEGORY_SLUG_EXISTED)
        }
    }

    #[derive(Clone, Default)]
    pub struct SubcategoriesRepoMock;

    impl SubcategoriesRepo for SubcategoriesRepoMock {
        fn find(&self, subcategory_id: SubcategoryId) -> RepoResult<Option<Subcategory>> {
            Ok(Some(create_subcategory(subcategory_id, MOCK_CATEGORY_ID)))
        }

        fn list_for_category(&self, category_id: CategoryId, _with_inactive: bool) -> RepoResult<Vec<Subcategory>> {
            Ok(vec![create_subcategory(MOCK_SUBCATEGORY_ID, category_id)])
        }

        fn create(&self, payload: NewSubcategory) -> RepoResult<Subcategory> {
            Ok(Subcategory {
                id: SubcategoryId(2),
                category_id: payload.category_id,
                name: payload.name,
                description: payload.description,
                is_active: true,
            })
        }

        fn update(&self, subcategory_id: SubcategoryId, payload: UpdateSubcategory) -> RepoResult<Subcategory> {
            let mut subcategory = create_subcategory(subcategory_id, MOCK_CATEGORY_ID);
            if let Some(name) = payload.name {
                subcategory.name = name;
            }
            Ok(subcategory)
        }
    }

    #[derive(Clone, Default)]
    pub struct AttributeDefinitionsRepoMock;

    impl AttributeDefinitionsRepo for AttributeDefinitionsRepoMock {
        fn find(&self, attribute_id: AttributeId) -> RepoResult<Option<AttributeDefinition>> {
            let mut definition = create_cuisine_attribute(MOCK_CATEGORY_ID);
            definition.id = attribute_id;
            Ok(Some(definition))
        }

        fn list_for_category(&self, category_id: CategoryId) -> RepoResult<Vec<AttributeDefinition>> {
            Ok(vec![create_cuisine_attribute(category_id), create_delivery_attribute(category_id)])
        }

        fn create(&self, payload: NewAttributeDefinitionRow) -> RepoResult<AttributeDefinition> {
            Ok(AttributeDefinition {
                id: AttributeId(3),
                category_id: payload.category_id,
                name: payload.name,
                value_type: payload.value_type.parse()?,
                options: ::serde_json::from_value(payload.options)?,
                required: payload.required,
                description: payload.description,
            })
        }

        fn update(&self, attribute_id: AttributeId, payload: UpdateAttributeDefinitionRow) -> RepoResult<AttributeDefinition> {
            let mut definition = create_cuisine_attribute(MOCK_CATEGORY_ID);
            definition.id = attribute_id;
            if let Some(name) = payload.name {
                definition.name = name;
            }
            if let Some(required) = payload.required {
                definition.required = required;
            }
            if let Some(value_type) = payload.value_type {
                definition.value_type = value_type.parse()?;
            }
            if let Some(options) = payload.options {
                definition.options = ::serde_json::from_value(options)?;
            }
            Ok(definition)
        }

        fn delete(&self, attribute_id: AttributeId) -> RepoResult<AttributeDefinition> {
            let mut definition = create_cuisine_attribute(MOCK_CATEGORY_ID);
            definition.id = attribute_id;
            Ok(definition)
        }
    }

    #[derive(Clone, Default)]
    pub struct BusinessesRepoMock;

    impl BusinessesRepo for BusinessesRepoMock {
        fn find(&self, business_id: BusinessId) -> RepoResult<Option<RawBusiness>> {
            if business_id == MOCK_MISSING_BUSINESS_ID {
                Ok(None)
            } else {
                Ok(Some(create_raw_business(business_id, MOCK_USER_ID)))
            }
        }

        fn list(&self, terms: BusinessesSearchTerms, _from: BusinessId, count: i64) -> RepoResult<Vec<RawBusiness>> {
            let owner = terms.user_id.unwrap_or(MOCK_USER_ID);
            Ok((1..count.min(3) as i32 + 1)
                .map(|id| create_raw_business(BusinessId(id), owner))
                .collect())
        }

        fn create(&self, payload: NewBusinessRow) -> RepoResult<RawBusiness> {
            Ok(RawBusiness {
                id: BusinessId(2),
                user_id: payload.user_id,
                name: payload.name,
                slug: payload.slug,
                description: payload.description,
                price_range: payload.price_range,
                category_id: payload.category_id,
                subcategory_id: payload.subcategory_id,
                address: payload.address,
                city: payload.city,
                state: payload.state,
                zip_code: payload.zip_code,
                phone: payload.phone,
                email: payload.email,
                website: payload.website,
                hours: payload.hours,
                social_media: payload.social_media,
                images: payload.images,
                additional_info: payload.additional_info,
                is_active: true,
                created_at: SystemTime::now(),
                updated_at: SystemTime::now(),
            })
        }

        fn update(&self, business_id: BusinessId, payload: UpdateBusinessRow) -> RepoResult<RawBusiness> {
            let mut business = create_raw_business(business_id, MOCK_USER_ID);
            business.name = payload.name;
            business.slug = payload.slug;
            business.description = payload.description;
            business.category_id = payload.category_id;
            business.subcategory_id = payload.subcategory_id;
            business.social_media = payload.social_media;
            Ok(business)
        }

        fn deactivate(&self, business_id: BusinessId) -> RepoResult<RawBusiness> {
            let mut business = create_raw_business(business_id, MOCK_USER_ID);
            business.is_active = false;
            Ok(business)
        }

        fn slug_exists(&self, slug: String, _exclude: Option<BusinessId>) -> RepoResult<bool> {
            Ok(slug == slugify(MOCK_BUSINESS_NAME_EXISTED))
        }
    }

    #[derive(Clone, Default)]
    pub struct BusinessAttributesRepoMock;

    impl BusinessAttributesRepo for BusinessAttributesRepoMock {
        fn list_for_business(&self, business_id: BusinessId) -> RepoResult<Vec<BusinessAttribute>> {
            Ok(vec![BusinessAttribute {
                id: 1,
                business_id,
                attribute_id: MOCK_CUISINE_ATTRIBUTE_ID,
                value: json!(["Thai"]),
            }])
        }

        fn list_for_businesses(&self, business_ids: Vec<BusinessId>) -> RepoResult<Vec<BusinessAttribute>> {
            Ok(business_ids
                .into_iter()
                .enumerate()
                .map(|(index, business_id)| BusinessAttribute {
                    id: index as i32 + 1,
                    business_id,
                    attribute_id: MOCK_CUISINE_ATTRIBUTE_ID,
                    value: json!(["Italian"]),
                }).collect())
        }

        fn replace(&self, _business_id: BusinessId, values: Vec<NewBusinessAttribute>) -> RepoResult<Vec<BusinessAttribute>> {
            Ok(values
                .into_iter()
                .enumerate()
                .map(|(index, value)| BusinessAttribute {
                    id: index as i32 + 1,
                    business_id: value.business_id,
                    attribute_id: value.attribute_id,
                    value: value.value,
                }).collect())
        }

        fn list_for_attribute(&self, attribute_id: AttributeId) -> RepoResult<Vec<BusinessAttribute>> {
            Ok(create_cuisine_values(attribute_id))
        }

        fn delete_by_attribute(&self, _attribute_id: AttributeId) -> RepoResult<Vec<BusinessAttribute>> {
            Ok(vec![])
        }

        fn delete_values(&self, value_ids: Vec<i32>) -> RepoResult<Vec<BusinessAttribute>> {
            Ok(create_cuisine_values(MOCK_CUISINE_ATTRIBUTE_ID)
                .into_iter()
                .filter(|value| value_ids.contains(&value.id))
                .collect())
        }
    }

    /// Cuisine values of three businesses, one per option
    pub fn create_cuisine_values(attribute_id: AttributeId) -> Vec<BusinessAttribute> {
        ["Italian", "Thai", "Mexican"]
            .iter()
            .enumerate()
            .map(|(index, option)| BusinessAttribute {
                id: index as i32 + 1,
                business_id: BusinessId(index as i32 + 1),
                attribute_id,
                value: json!([option]),
            }).collect()
    }

    #[derive(Default)]
    pub struct MockConnection {
        tr: AnsiTransactionManager,
    }

    impl Connection for MockConnection {
        type Backend = Pg;
        type TransactionManager = AnsiTransactionManager;

        fn establish(_database_url: &str) -> ConnectionResult<MockConnection> {
            Ok(MockConnection::default())
        }

        fn execute(&self, _query: &str) -> QueryResult<usize> {
            unimplemented!()
        }

        fn query_by_index<T, U>(&self, _source: T) -> QueryResult<Vec<U>>
        where
            T: AsQuery,
            T::Query: QueryFragment<Pg> + QueryId,
            Pg: HasSqlType<T::SqlType>,
            U: Queryable<T::SqlType, Pg>,
        {
            unimplemented!()
        }

        fn query_by_name<T, U>(&self, _source: &T) -> QueryResult<Vec<U>>
        where
            T: QueryFragment<Pg> + QueryId,
            U: QueryableByName<Pg>,
        {
            unimplemented!()
        }

        fn execute_returning_count<T>(&self, _source: &T) -> QueryResult<usize>
        where
            T: QueryFragment<Pg> + QueryId,
        {
            unimplemented!()
        }

        fn transaction_manager(&self) -> &Self::TransactionManager {
            &self.tr
        }
    }

    impl SimpleConnection for MockConnection {
        fn batch_execute(&self, _query: &str) -> QueryResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MockConnectionManager;

    impl ManageConnection for MockConnectionManager {
        type Connection = MockConnection;
        type Error = MockError;

        fn connect(&self) -> Result<MockConnection, MockError> {
            Ok(MockConnection::default())
        }

        fn is_valid(&self, _conn: &mut MockConnection) -> Result<(), MockError> {
            Ok(())
        }

        fn has_broken(&self, _conn: &mut MockConnection) -> bool {
            false
        }
    }

    #[derive(Debug)]
    pub struct MockError {}

    impl fmt::Display for MockError {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Mock connection can not fail")
        }
    }

    impl Error for MockError {
        fn description(&self) -> &str {
            "Mock connection error"
        }

        fn cause(&self) -> Option<&Error> {
            None
        }
    }
}
