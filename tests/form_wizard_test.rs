extern crate directory_lib;
extern crate failure;
extern crate futures;
extern crate image;
#[macro_use]
extern crate serde_json;

use std::cell::RefCell;
use std::io::Cursor;
use std::ops::Range;
use std::time::SystemTime;

use failure::Error as FailureError;
use futures::future;
use futures::Future;
use image::{DynamicImage, ImageOutputFormat, RgbImage};

use directory_lib::errors::Error;
use directory_lib::form::*;
use directory_lib::models::*;
use directory_lib::services::types::ServiceFuture;

/// Records every payload and answers with the business it would have created
#[derive(Default)]
struct RecordingDispatcher {
    created: RefCell<Vec<BusinessPayload>>,
    updated: RefCell<Vec<(BusinessId, BusinessPayload)>>,
    pending: bool,
}

impl RecordingDispatcher {
    fn pending() -> Self {
        Self {
            pending: true,
            ..Default::default()
        }
    }

    fn answer(&self, business_id: BusinessId, payload: BusinessPayload) -> ServiceFuture<Business> {
        if self.pending {
            Box::new(future::empty())
        } else {
            Box::new(future::ok(business_of(business_id, payload)))
        }
    }
}

impl BusinessDispatcher for RecordingDispatcher {
    fn create_business(&self, payload: BusinessPayload) -> ServiceFuture<Business> {
        self.created.borrow_mut().push(payload.clone());
        self.answer(BusinessId(100), payload)
    }

    fn update_business(&self, business_id: BusinessId, payload: BusinessPayload) -> ServiceFuture<Business> {
        self.updated.borrow_mut().push((business_id, payload.clone()));
        self.answer(business_id, payload)
    }
}

fn business_of(business_id: BusinessId, payload: BusinessPayload) -> Business {
    let attributes = payload
        .attributes
        .iter()
        .enumerate()
        .map(|(index, value)| BusinessAttribute {
            id: index as i32 + 1,
            business_id,
            attribute_id: value.attribute_id,
            value: value.value.clone(),
        }).collect();
    Business {
        id: business_id,
        user_id: UserId(1),
        slug: slugify(&payload.name),
        name: payload.name,
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
        attributes,
        is_active: true,
        created_at: SystemTime::now(),
        updated_at: SystemTime::now(),
    }
}

fn category(id: i32, name: &str) -> Category {
    Category {
        id: CategoryId(id),
        name: name.to_string(),
        description: String::new(),
        slug: slugify(name),
        icon: None,
        is_active: true,
        created_at: SystemTime::now(),
        updated_at: SystemTime::now(),
    }
}

fn definition(id: i32, category_id: i32, name: &str, value_type: AttributeType, options: &[&str], required: bool) -> AttributeDefinition {
    AttributeDefinition {
        id: AttributeId(id),
        category_id: CategoryId(category_id),
        name: name.to_string(),
        value_type,
        options: options.iter().map(|option| option.to_string()).collect(),
        required,
        description: None,
    }
}

fn restaurant() -> CategorySchema {
    CategorySchema {
        category: category(1, "Restaurant"),
        subcategories: vec![Subcategory {
            id: SubcategoryId(10),
            category_id: CategoryId(1),
            name: "Pizzeria".to_string(),
            description: String::new(),
            is_active: true,
        }],
        attributes: vec![
            definition(1, 1, "Cuisine", AttributeType::MultiSelect, &["Italian", "Thai", "Mexican"], true),
            definition(2, 1, "Seats", AttributeType::Number, &[], false),
        ],
    }
}

fn plumbing() -> CategorySchema {
    CategorySchema {
        category: category(2, "Plumbing"),
        subcategories: vec![],
        attributes: vec![
            definition(5, 2, "License number", AttributeType::Text, &[], true),
            definition(6, 2, "Emergency service", AttributeType::Boolean, &[], true),
        ],
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn fill_basic_info(wizard: &mut Wizard) {
    let draft = wizard.draft_mut().unwrap();
    draft.name = "Joe's Diner".to_string();
    draft.description = "Classic diner food all day long".to_string();
    draft.price_range = 2;
}

fn fill_contact(wizard: &mut Wizard) {
    let draft = wizard.draft_mut().unwrap();
    draft.address = "1 Main St".to_string();
    draft.city = "Springfield".to_string();
    draft.state = "IL".to_string();
    draft.zip_code = "62701".to_string();
    draft.phone = "(555) 123-4567".to_string();
}

/// Walks a fresh form to the last step with Restaurant and Thai cuisine selected
fn filled_wizard() -> Wizard {
    let mut wizard = Wizard::new();
    fill_basic_info(&mut wizard);
    wizard.next().unwrap();
    wizard.select_category(restaurant()).unwrap();
    wizard.toggle_attribute_option(AttributeId(1), "Thai").unwrap();
    wizard.next().unwrap();
    fill_contact(&mut wizard);
    wizard.next().unwrap();
    wizard.next().unwrap();
    wizard
}

#[test]
fn required_cuisine_blocks_the_category_step() {
    let mut wizard = Wizard::new();
    fill_basic_info(&mut wizard);
    assert_eq!(wizard.next().unwrap(), FormStep::CategoryAndAttributes);

    wizard.select_category(restaurant()).unwrap();
    assert!(wizard.next().is_err());
    assert_eq!(wizard.errors().fields(), vec!["Cuisine"]);
    assert_eq!(wizard.step(), FormStep::CategoryAndAttributes);
    assert_eq!(wizard.draft().name, "Joe's Diner");

    wizard.toggle_attribute_option(AttributeId(1), "Thai").unwrap();
    assert_eq!(wizard.next().unwrap(), FormStep::ContactAndLocation);
    assert!(wizard.errors().is_empty());
}

#[test]
fn switching_to_plumbing_clears_restaurant_values() {
    let mut wizard = filled_wizard();
    assert_eq!(wizard.step(), FormStep::AdditionalInfo);
    while wizard.step() != FormStep::CategoryAndAttributes {
        wizard.back().unwrap();
    }

    wizard.select_category(plumbing()).unwrap();

    let ids: Vec<AttributeId> = wizard.attributes().values().iter().map(|&(definition, _)| definition.id).collect();
    assert_eq!(ids, vec![AttributeId(5), AttributeId(6)]);
    assert_eq!(wizard.attributes().get(AttributeId(1)), None);
    assert_eq!(wizard.attributes().get(AttributeId(5)), Some(AttributeValue::Text(String::new())));
    assert_eq!(wizard.draft().city, "Springfield");

    assert!(wizard.next().is_err());
    assert_eq!(wizard.errors().fields(), vec!["License number"]);

    wizard.set_attribute_input(AttributeId(5), "PL-1234").unwrap();
    assert_eq!(wizard.next().unwrap(), FormStep::ContactAndLocation);
}

#[test]
fn submission_normalizes_social_links_and_attributes() {
    let mut wizard = filled_wizard();
    {
        let draft = wizard.draft_mut().unwrap();
        draft.social_media = vec![
            SocialLink {
                platform: "Facebook".to_string(),
                url: "".to_string(),
            },
            SocialLink {
                platform: "Instagram".to_string(),
                url: "https://instagram.com/x".to_string(),
            },
        ];
    }
    let dispatcher = RecordingDispatcher::default();

    let future = wizard.submit(&dispatcher).into_future().unwrap();
    assert_eq!(wizard.phase(), WizardPhase::Submitting);
    let phase = wizard.complete_submission(future.wait());

    assert_eq!(phase, WizardPhase::Submitted);
    let created = dispatcher.created.borrow();
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].social_media,
        vec![SocialLink {
            platform: "Instagram".to_string(),
            url: "https://instagram.com/x".to_string(),
        }]
    );
    assert_eq!(
        created[0].attributes,
        vec![
            AttributeValuePayload {
                attribute_id: AttributeId(1),
                value: json!(["Thai"]),
            },
            AttributeValuePayload {
                attribute_id: AttributeId(2),
                value: json!(0.0),
            },
        ]
    );
    assert_eq!(created[0].phone, Some("(555) 123-4567".to_string()));
    assert_eq!(wizard.submitted().map(|business| business.id), Some(BusinessId(100)));
}

#[test]
fn submit_is_ignored_while_in_flight() {
    let mut wizard = filled_wizard();
    let dispatcher = RecordingDispatcher::pending();

    assert!(wizard.submit(&dispatcher).is_dispatched());
    match wizard.submit(&dispatcher) {
        SubmitOutcome::Busy => {}
        _ => panic!("second submit must not dispatch"),
    }
    assert_eq!(dispatcher.created.borrow().len(), 1);
    assert!(wizard.is_busy());
}

#[test]
fn form_is_frozen_while_submitting() {
    let mut wizard = filled_wizard();
    let dispatcher = RecordingDispatcher::pending();
    assert!(wizard.submit(&dispatcher).is_dispatched());

    assert_eq!(wizard.back(), Err(FormError::Busy));
    assert_eq!(wizard.next(), Err(FormError::Busy));
    assert_eq!(wizard.select_category(plumbing()), Err(FormError::Busy));
    assert_eq!(wizard.toggle_attribute_option(AttributeId(1), "Italian"), Err(FormError::Busy));
    assert!(wizard.draft_mut().is_err());
    assert_eq!(wizard.add_images(vec![ImageFile::new("menu.png", png(40, 40))]), Err(FormError::Busy));
    assert_eq!(wizard.draft().category_id, Some(CategoryId(1)));
    assert_eq!(
        wizard.attributes().get(AttributeId(1)),
        Some(AttributeValue::MultiSelect(vec!["Thai".to_string()]))
    );

    let phase = wizard.complete_submission(Err(failure::err_msg("connection reset")));
    assert_eq!(phase, WizardPhase::Editing(FormStep::AdditionalInfo));
    assert!(wizard.notice().is_some());
    assert_eq!(wizard.back(), Ok(FormStep::HoursAndSocial));
}

#[test]
fn submitted_form_stays_as_saved() {
    let mut wizard = filled_wizard();
    let dispatcher = RecordingDispatcher::default();
    let future = wizard.submit(&dispatcher).into_future().unwrap();
    assert_eq!(wizard.complete_submission(future.wait()), WizardPhase::Submitted);

    assert_eq!(wizard.back(), Err(FormError::Submitted));
    assert_eq!(wizard.select_category(plumbing()), Err(FormError::Submitted));
    assert_eq!(wizard.set_attribute_input(AttributeId(2), "40"), Err(FormError::Submitted));
    assert!(wizard.draft_mut().is_err());
    assert_eq!(wizard.payload(), dispatcher.created.borrow()[0]);
}

#[test]
fn failed_submission_can_be_retried() {
    let mut wizard = filled_wizard();
    let dispatcher = RecordingDispatcher::default();

    assert!(wizard.submit(&dispatcher).is_dispatched());
    let conflict: FailureError = format_err_validation("name", "Business with this name already exists");
    let phase = wizard.complete_submission(Err(conflict));

    assert_eq!(phase, WizardPhase::Editing(FormStep::AdditionalInfo));
    assert!(wizard.errors().contains("name"));

    wizard.draft_mut().unwrap().name = "Joe's Other Diner".to_string();
    let future = wizard.submit(&dispatcher).into_future().unwrap();
    assert_eq!(wizard.complete_submission(future.wait()), WizardPhase::Submitted);
    assert_eq!(dispatcher.created.borrow().len(), 2);
}

fn format_err_validation(field: &str, message: &str) -> FailureError {
    let mut errors = FieldErrors::new();
    errors.add(field, "slug", message);
    failure::err_msg("Business payload is invalid").context(Error::Validate(errors)).into()
}

#[test]
fn oversized_image_is_rejected_and_batch_continues() {
    let mut wizard = Wizard::new();
    let rejected = wizard
        .add_images(vec![
            ImageFile::new("huge.jpg", vec![0; 6 * 1024 * 1024]),
            ImageFile::new("storefront.png", png(2400, 1200)),
            ImageFile::new("menu.png", png(300, 300)),
        ]).unwrap();

    assert_eq!(rejected.len(), 1);
    match rejected[0] {
        ImageRejection::TooLarge { ref name, .. } => assert_eq!(name, "huge.jpg"),
        ref other => panic!("unexpected rejection {:?}", other),
    }
    assert_eq!(wizard.draft().images.len(), 2);
    assert!(wizard.draft().images.iter().all(|uri| uri.starts_with("data:image/jpeg;base64,")));
}

#[test]
fn image_cap_matches_what_the_server_accepts() {
    let mut wizard = Wizard::new();
    let pngs = |range: Range<u32>| -> Vec<ImageFile> { range.map(|i| ImageFile::new(format!("{}.png", i), png(40, 40))).collect() };
    let first = wizard.add_images(pngs(0..3)).unwrap();
    let second = wizard.add_images(pngs(3..6)).unwrap();

    assert!(first.is_empty());
    assert_eq!(
        second,
        vec![ImageRejection::TooMany {
            name: "5.png".to_string(),
            limit: MAX_BUSINESS_IMAGES,
        }]
    );
    assert_eq!(wizard.draft().images.len(), MAX_BUSINESS_IMAGES);
    assert!(validate_images(&wizard.draft().images).is_ok());
}

#[test]
fn editing_dispatches_an_update() {
    let mut payload = filled_wizard().payload();
    payload.attributes = vec![AttributeValuePayload {
        attribute_id: AttributeId(1),
        value: json!(["Italian", "Mexican"]),
    }];
    let business = business_of(BusinessId(7), payload);

    let mut wizard = Wizard::for_edit(&business, restaurant());
    assert_eq!(
        wizard.attributes().get(AttributeId(1)),
        Some(AttributeValue::MultiSelect(vec!["Italian".to_string(), "Mexican".to_string()]))
    );
    while !wizard.step().is_last() {
        wizard.next().unwrap();
    }

    let dispatcher = RecordingDispatcher::default();
    let future = wizard.submit(&dispatcher).into_future().unwrap();
    wizard.complete_submission(future.wait());

    let updated = dispatcher.updated.borrow();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].0, BusinessId(7));
    assert!(dispatcher.created.borrow().is_empty());
}
