use std::fmt;
use std::sync::{Arc, RwLock};

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson};
use mongodb::Client;

use crate::models::bookings::{BookedStay, Booking, BookingStatus};
use crate::models::listing::{Listing, ListingStatus, ListingType};

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    Internal(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "not found"),
            RepositoryError::Internal(msg) => write!(f, "repository error: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        RepositoryError::Internal(err.to_string())
    }
}

/// Catalog port. Listings are immutable from the pricing engine's point of
/// view; only the owning vendor/admin surface writes through here.
pub trait ListingRepository {
    async fn get(&self, id: &ObjectId) -> Result<Listing, RepositoryError>;
    async fn list_active(
        &self,
        listing_type: Option<ListingType>,
        location_id: Option<ObjectId>,
    ) -> Result<Vec<Listing>, RepositoryError>;
    async fn insert(&self, listing: &Listing) -> Result<ObjectId, RepositoryError>;
    async fn set_status(&self, id: &ObjectId, status: ListingStatus)
        -> Result<(), RepositoryError>;
}

/// Booking persistence port.
pub trait BookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId, RepositoryError>;
    async fn for_user(&self, user_id: &ObjectId) -> Result<Vec<Booking>, RepositoryError>;
    async fn get(
        &self,
        user_id: &ObjectId,
        booking_id: &ObjectId,
    ) -> Result<Booking, RepositoryError>;
    async fn set_status(
        &self,
        booking_id: &ObjectId,
        status: BookingStatus,
    ) -> Result<(), RepositoryError>;
    async fn find_by_transaction(&self, transaction_id: &str)
        -> Result<Booking, RepositoryError>;
    /// Dated stays held by pending/confirmed bookings for one listing, the
    /// input the availability check runs against.
    async fn booked_stays(&self, listing_id: &ObjectId) -> Result<Vec<BookedStay>, RepositoryError>;
}

#[derive(Clone)]
pub struct MongoListingRepository {
    client: Arc<Client>,
}

impl MongoListingRepository {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<Listing> {
        self.client.database("Catalog").collection("Listings")
    }
}

impl ListingRepository for MongoListingRepository {
    async fn get(&self, id: &ObjectId) -> Result<Listing, RepositoryError> {
        self.collection()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_active(
        &self,
        listing_type: Option<ListingType>,
        location_id: Option<ObjectId>,
    ) -> Result<Vec<Listing>, RepositoryError> {
        let mut filter = doc! { "status": "active" };
        if let Some(listing_type) = listing_type {
            let value = to_bson(&listing_type)
                .map_err(|err| RepositoryError::Internal(err.to_string()))?;
            filter.insert("listing_type", value);
        }
        if let Some(location_id) = location_id {
            filter.insert("location_id", location_id);
        }

        let cursor = self.collection().find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, listing: &Listing) -> Result<ObjectId, RepositoryError> {
        let result = self.collection().insert_one(listing).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::Internal("inserted id was not an ObjectId".to_string()))
    }

    async fn set_status(
        &self,
        id: &ObjectId,
        status: ListingStatus,
    ) -> Result<(), RepositoryError> {
        let value = to_bson(&status).map_err(|err| RepositoryError::Internal(err.to_string()))?;
        let updated_at =
            to_bson(&Utc::now()).map_err(|err| RepositoryError::Internal(err.to_string()))?;
        let result = self
            .collection()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": value, "updated_at": updated_at } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct MongoBookingRepository {
    client: Arc<Client>,
}

impl MongoBookingRepository {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<Booking> {
        self.client.database("Account").collection("Bookings")
    }
}

impl BookingRepository for MongoBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId, RepositoryError> {
        let result = self.collection().insert_one(booking).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RepositoryError::Internal("inserted id was not an ObjectId".to_string()))
    }

    async fn for_user(&self, user_id: &ObjectId) -> Result<Vec<Booking>, RepositoryError> {
        let cursor = self
            .collection()
            .find(doc! { "user_id": user_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get(
        &self,
        user_id: &ObjectId,
        booking_id: &ObjectId,
    ) -> Result<Booking, RepositoryError> {
        self.collection()
            .find_one(doc! { "_id": booking_id, "user_id": user_id })
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_status(
        &self,
        booking_id: &ObjectId,
        status: BookingStatus,
    ) -> Result<(), RepositoryError> {
        let value = to_bson(&status).map_err(|err| RepositoryError::Internal(err.to_string()))?;
        let updated_at =
            to_bson(&Utc::now()).map_err(|err| RepositoryError::Internal(err.to_string()))?;
        let result = self
            .collection()
            .update_one(
                doc! { "_id": booking_id },
                doc! { "$set": { "status": value, "updated_at": updated_at } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Booking, RepositoryError> {
        self.collection()
            .find_one(doc! { "transaction_id": transaction_id })
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn booked_stays(
        &self,
        listing_id: &ObjectId,
    ) -> Result<Vec<BookedStay>, RepositoryError> {
        let filter = doc! {
            "status": { "$in": ["pending", "confirmed"] },
            "items.listing_id": listing_id,
        };

        let bookings: Vec<Booking> = self.collection().find(filter).await?.try_collect().await?;

        let stays = bookings
            .iter()
            .flat_map(|booking| booking.items.iter())
            .filter(|item| item.listing_id == *listing_id)
            .filter_map(|item| match (item.start_date, item.end_date) {
                (Some(start), Some(end)) => Some(BookedStay {
                    listing_id: item.listing_id,
                    start_date: start,
                    end_date: end,
                }),
                _ => None,
            })
            .collect();

        Ok(stays)
    }
}

/// In-memory implementations, used by tests and available as a backing store
/// when no database is configured.
#[derive(Default, Clone)]
pub struct InMemoryListingRepository {
    listings: Arc<RwLock<Vec<Listing>>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListingRepository for InMemoryListingRepository {
    async fn get(&self, id: &ObjectId) -> Result<Listing, RepositoryError> {
        let listings = self.listings.read().unwrap();
        listings
            .iter()
            .find(|l| l.id.as_ref() == Some(id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_active(
        &self,
        listing_type: Option<ListingType>,
        location_id: Option<ObjectId>,
    ) -> Result<Vec<Listing>, RepositoryError> {
        let listings = self.listings.read().unwrap();
        Ok(listings
            .iter()
            .filter(|l| l.status == ListingStatus::Active)
            .filter(|l| listing_type.map_or(true, |t| l.listing_type == t))
            .filter(|l| location_id.map_or(true, |loc| l.location_id == loc))
            .cloned()
            .collect())
    }

    async fn insert(&self, listing: &Listing) -> Result<ObjectId, RepositoryError> {
        let mut listings = self.listings.write().unwrap();
        let mut stored = listing.clone();
        let id = stored.id.unwrap_or_else(ObjectId::new);
        stored.id = Some(id);
        listings.push(stored);
        Ok(id)
    }

    async fn set_status(
        &self,
        id: &ObjectId,
        status: ListingStatus,
    ) -> Result<(), RepositoryError> {
        let mut listings = self.listings.write().unwrap();
        let listing = listings
            .iter_mut()
            .find(|l| l.id.as_ref() == Some(id))
            .ok_or(RepositoryError::NotFound)?;
        listing.status = status;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<Vec<Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId, RepositoryError> {
        let mut bookings = self.bookings.write().unwrap();
        let mut stored = booking.clone();
        let id = stored.id.unwrap_or_else(ObjectId::new);
        stored.id = Some(id);
        bookings.push(stored);
        Ok(id)
    }

    async fn for_user(&self, user_id: &ObjectId) -> Result<Vec<Booking>, RepositoryError> {
        let bookings = self.bookings.read().unwrap();
        Ok(bookings
            .iter()
            .filter(|b| b.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        user_id: &ObjectId,
        booking_id: &ObjectId,
    ) -> Result<Booking, RepositoryError> {
        let bookings = self.bookings.read().unwrap();
        bookings
            .iter()
            .find(|b| b.id.as_ref() == Some(booking_id) && b.user_id == *user_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_status(
        &self,
        booking_id: &ObjectId,
        status: BookingStatus,
    ) -> Result<(), RepositoryError> {
        let mut bookings = self.bookings.write().unwrap();
        let booking = bookings
            .iter_mut()
            .find(|b| b.id.as_ref() == Some(booking_id))
            .ok_or(RepositoryError::NotFound)?;
        booking.status = status;
        Ok(())
    }

    async fn find_by_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<Booking, RepositoryError> {
        let bookings = self.bookings.read().unwrap();
        bookings
            .iter()
            .find(|b| b.transaction_id.as_deref() == Some(transaction_id))
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn booked_stays(
        &self,
        listing_id: &ObjectId,
    ) -> Result<Vec<BookedStay>, RepositoryError> {
        let bookings = self.bookings.read().unwrap();
        Ok(bookings
            .iter()
            .filter(|b| b.status.blocks_availability())
            .flat_map(|b| b.items.iter())
            .filter(|item| item.listing_id == *listing_id)
            .filter_map(|item| match (item.start_date, item.end_date) {
                (Some(start), Some(end)) => Some(BookedStay {
                    listing_id: item.listing_id,
                    start_date: start,
                    end_date: end,
                }),
                _ => None,
            })
            .collect())
    }
}
