use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entities::{prelude::*, users};
use crate::models::UserProfile;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_profile(&self, id: i32) -> Result<Option<UserProfile>> {
        let row = Users::find_by_id(id).one(&self.conn).await?;
        Ok(row.map(to_profile))
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Users::find().count(&self.conn).await?)
    }
}

fn to_profile(model: users::Model) -> UserProfile {
    UserProfile {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        profile_image: model.profile_image,
        latitude: model.latitude,
        longitude: model.longitude,
        city: model.city,
        state: model.state,
        notification_radius_miles: model.notification_radius_miles,
        show_city_only: model.show_city_only,
        is_active: model.is_active,
    }
}
