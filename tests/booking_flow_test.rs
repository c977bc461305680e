use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;

use vizit_api::models::bookings::BookingStatus;
use vizit_api::models::cart::{AddonSelection, CartLine};
use vizit_api::models::listing::{Addon, AddonPricing, Listing, ListingStatus, ListingType};
use vizit_api::services::booking::{BookingError, BookingService};
use vizit_api::services::cart::CartError;
use vizit_api::services::pricing::TaxPolicy;
use vizit_api::services::repository::{
    BookingRepository, InMemoryBookingRepository, InMemoryListingRepository, ListingRepository,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn room_with_breakfast() -> (Listing, ObjectId) {
    let addon_id = ObjectId::new();
    let listing = Listing {
        id: Some(ObjectId::new()),
        vendor_id: ObjectId::new(),
        location_id: ObjectId::new(),
        title: "Kivu Lake Room".to_string(),
        description: Some("Room with a lake view".to_string()),
        listing_type: ListingType::HotelRoom,
        unit_price: 100.0,
        currency: "usd".to_string(),
        capacity: 2,
        status: ListingStatus::Active,
        addons: vec![Addon {
            id: addon_id,
            name: "Breakfast".to_string(),
            price: 20.0,
            pricing: AddonPricing::PerNight,
        }],
        created_at: None,
        updated_at: None,
    };
    (listing, addon_id)
}

fn dated_line(listing: &Listing, start: NaiveDate, end: NaiveDate) -> CartLine {
    CartLine {
        id: None,
        listing_id: listing.id.unwrap(),
        start_date: Some(start),
        end_date: Some(end),
        guests: 2,
        addons: vec![],
    }
}

#[actix_web::test]
async fn full_checkout_prices_and_holds_the_dates() {
    let listings = InMemoryListingRepository::new();
    let bookings = InMemoryBookingRepository::new();
    let (listing, addon_id) = room_with_breakfast();
    listings.insert(&listing).await.unwrap();

    let mut line = dated_line(&listing, date(2024, 1, 10), date(2024, 1, 13));
    line.addons.push(AddonSelection {
        addon_id,
        quantity: 1,
    });

    let user_id = ObjectId::new();
    let booking = BookingService::create(
        &listings,
        &bookings,
        &TaxPolicy::default(),
        user_id,
        &[line],
        Some("cus_123".to_string()),
        Some("pi_123".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.subtotal, 360.0);
    assert!((booking.total - 360.0 * 1.18).abs() < 0.01);
    assert_eq!(booking.items.len(), 1);
    assert_eq!(booking.items[0].addons[0].subtotal, 60.0);

    // The held stay now blocks the same dates for this listing.
    let stays = bookings
        .booked_stays(&listing.id.unwrap())
        .await
        .unwrap();
    assert_eq!(stays.len(), 1);
    assert_eq!(stays[0].start_date, date(2024, 1, 10));

    // And the booking is retrievable by its owner.
    let fetched = bookings
        .get(&user_id, &booking.id.unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.reference, booking.reference);
}

#[actix_web::test]
async fn double_booking_is_rejected_across_users() {
    let listings = InMemoryListingRepository::new();
    let bookings = InMemoryBookingRepository::new();
    let (listing, _) = room_with_breakfast();
    listings.insert(&listing).await.unwrap();

    BookingService::create(
        &listings,
        &bookings,
        &TaxPolicy::default(),
        ObjectId::new(),
        &[dated_line(&listing, date(2024, 2, 1), date(2024, 2, 5))],
        None,
        None,
    )
    .await
    .unwrap();

    let overlapping = dated_line(&listing, date(2024, 2, 3), date(2024, 2, 8));
    let result = BookingService::create(
        &listings,
        &bookings,
        &TaxPolicy::default(),
        ObjectId::new(),
        &[overlapping],
        None,
        None,
    )
    .await;

    match result {
        Err(BookingError::Unavailable(id)) => assert_eq!(id, listing.id.unwrap()),
        other => panic!("expected Unavailable, got {:?}", other.map(|b| b.reference)),
    }
}

#[actix_web::test]
async fn undated_experience_lines_skip_the_availability_check() {
    let listings = InMemoryListingRepository::new();
    let bookings = InMemoryBookingRepository::new();

    let tour = Listing {
        id: Some(ObjectId::new()),
        vendor_id: ObjectId::new(),
        location_id: ObjectId::new(),
        title: "Gorilla trek".to_string(),
        description: None,
        listing_type: ListingType::Tour,
        unit_price: 80.0,
        currency: "usd".to_string(),
        capacity: 8,
        status: ListingStatus::Active,
        addons: vec![],
        created_at: None,
        updated_at: None,
    };
    listings.insert(&tour).await.unwrap();

    let line = CartLine {
        id: None,
        listing_id: tour.id.unwrap(),
        start_date: None,
        end_date: None,
        guests: 4,
        addons: vec![],
    };

    // Two bookings of the same undated tour line both succeed.
    for _ in 0..2 {
        let booking = BookingService::create(
            &listings,
            &bookings,
            &TaxPolicy::default(),
            ObjectId::new(),
            &[line.clone()],
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(booking.subtotal, 320.0);
    }
}

#[actix_web::test]
async fn paused_listing_cannot_be_booked() {
    let listings = InMemoryListingRepository::new();
    let bookings = InMemoryBookingRepository::new();
    let (mut listing, _) = room_with_breakfast();
    listing.status = ListingStatus::Paused;
    listings.insert(&listing).await.unwrap();

    let result = BookingService::create(
        &listings,
        &bookings,
        &TaxPolicy::default(),
        ObjectId::new(),
        &[dated_line(&listing, date(2024, 5, 1), date(2024, 5, 3))],
        None,
        None,
    )
    .await;

    assert!(matches!(
        result,
        Err(BookingError::Cart(CartError::ListingNotActive))
    ));
}

#[actix_web::test]
async fn unknown_listing_is_reported_by_id() {
    let listings = InMemoryListingRepository::new();
    let bookings = InMemoryBookingRepository::new();

    let missing = ObjectId::new();
    let line = CartLine {
        id: None,
        listing_id: missing,
        start_date: None,
        end_date: None,
        guests: 1,
        addons: vec![],
    };

    let result = BookingService::create(
        &listings,
        &bookings,
        &TaxPolicy::default(),
        ObjectId::new(),
        &[line],
        None,
        None,
    )
    .await;

    match result {
        Err(BookingError::ListingNotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected ListingNotFound, got {:?}", other.map(|b| b.reference)),
    }
}
