use regex::Regex;

use models::{AttributeId, BusinessId, CategoryId, SubcategoryId};

type ParamsConverter<R> = Fn(Vec<&str>) -> Option<R> + Send + Sync;

/// Matches request paths against regexes, first match wins
pub struct RouteParser<R> {
    regex_and_converters: Vec<(Regex, Box<ParamsConverter<R>>)>,
}

impl<R> Default for RouteParser<R> {
    fn default() -> Self {
        Self {
            regex_and_converters: Vec::new(),
        }
    }
}

impl<R> RouteParser<R> {
    /// Adds a route without params
    pub fn add_route<F>(&mut self, regex_pattern: &str, f: F)
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.add_route_with_params(regex_pattern, move |_| Some(f()));
    }

    /// Adds a route, captured groups of the regex are passed to the converter
    pub fn add_route_with_params<F>(&mut self, regex_pattern: &str, converter: F)
    where
        F: Fn(Vec<&str>) -> Option<R> + Send + Sync + 'static,
    {
        match Regex::new(regex_pattern) {
            Ok(regex) => self.regex_and_converters.push((regex, Box::new(converter))),
            Err(e) => error!("Route {} is skipped, pattern is invalid: {}", regex_pattern, e),
        }
    }

    /// Finds the route for the path
    pub fn test(&self, route: &str) -> Option<R> {
        self.regex_and_converters.iter().fold(None, |acc, &(ref regex, ref converter)| {
            if acc.is_some() {
                return acc;
            }
            regex.captures(route).and_then(|captures| {
                let params = captures.iter().skip(1).filter_map(|capture| capture.map(|m| m.as_str())).collect();
                converter(params)
            })
        })
    }
}

/// List of all routes with params for the app
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    Categories,
    Category(CategoryId),
    CategorySchema(CategoryId),
    CategorySubcategories(CategoryId),
    CategoryAttributes(CategoryId),
    Subcategory(SubcategoryId),
    Attribute(AttributeId),
    Businesses,
    BusinessesByOwner,
    Business(BusinessId),
}

fn first_param<T: ::std::str::FromStr>(params: Vec<&str>) -> Option<T> {
    params.get(0).and_then(|string_id| string_id.parse::<T>().ok())
}

pub fn create_route_parser() -> RouteParser<Route> {
    let mut router = RouteParser::default();

    // Healthcheck
    router.add_route(r"^/healthcheck$", || Route::Healthcheck);

    // Categories routes
    router.add_route(r"^/categories$", || Route::Categories);
    router.add_route_with_params(r"^/categories/(\d+)$", |params| first_param(params).map(Route::Category));
    router.add_route_with_params(r"^/categories/(\d+)/schema$", |params| {
        first_param(params).map(Route::CategorySchema)
    });
    router.add_route_with_params(r"^/categories/(\d+)/subcategories$", |params| {
        first_param(params).map(Route::CategorySubcategories)
    });
    router.add_route_with_params(r"^/categories/(\d+)/attributes$", |params| {
        first_param(params).map(Route::CategoryAttributes)
    });

    // Subcategories routes
    router.add_route_with_params(r"^/subcategories/(\d+)$", |params| first_param(params).map(Route::Subcategory));

    // Attributes routes
    router.add_route_with_params(r"^/attributes/(\d+)$", |params| first_param(params).map(Route::Attribute));

    // Businesses routes
    router.add_route(r"^/businesses$", || Route::Businesses);
    router.add_route(r"^/businesses/by_owner$", || Route::BusinessesByOwner);
    router.add_route_with_params(r"^/businesses/(\d+)$", |params| first_param(params).map(Route::Business));

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_are_parsed() {
        let router = create_route_parser();
        assert_eq!(router.test("/healthcheck"), Some(Route::Healthcheck));
        assert_eq!(router.test("/categories/3/schema"), Some(Route::CategorySchema(CategoryId(3))));
        assert_eq!(router.test("/businesses/by_owner"), Some(Route::BusinessesByOwner));
        assert_eq!(router.test("/businesses/42"), Some(Route::Business(BusinessId(42))));
        assert_eq!(router.test("/attributes/7"), Some(Route::Attribute(AttributeId(7))));
    }

    #[test]
    fn unknown_paths_are_not_routed() {
        let router = create_route_parser();
        assert_eq!(router.test("/businesses/joes"), None);
        assert_eq!(router.test("/stores"), None);
    }
}
