use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::domain::{
    BuilderDetail, BuilderFields, BuilderId, BuilderInput, BuilderSummary, House, HouseBuilder,
    HouseFields, HouseId, HouseInput,
};
use super::repository::BuilderRepository;
use crate::error::ServiceError;
use crate::slug;
use crate::validation::{clean, ValidationErrors, Validator, MAX_NAME_LEN, MAX_TEXT_LEN};

const MAX_PRICE: u64 = 100_000_000;

pub struct BuilderService {
    builders: Arc<dyn BuilderRepository>,
}

impl BuilderService {
    pub fn new(builders: Arc<dyn BuilderRepository>) -> Self {
        Self { builders }
    }

    pub fn list_builders(&self) -> Result<Vec<BuilderSummary>, ServiceError> {
        let mut counts: HashMap<BuilderId, usize> = HashMap::new();
        for house in self.builders.list_houses(None)? {
            *counts.entry(house.builder_id).or_insert(0) += 1;
        }

        Ok(self
            .builders
            .list_builders()?
            .into_iter()
            .map(|builder| BuilderSummary {
                house_count: counts.get(&builder.id).copied().unwrap_or(0),
                builder,
            })
            .collect())
    }

    pub fn get_builder(&self, id: BuilderId) -> Result<BuilderDetail, ServiceError> {
        let builder = self
            .builders
            .fetch_builder(id)?
            .ok_or(ServiceError::NotFound("builder"))?;
        let houses = self.builders.list_houses(Some(id))?;
        Ok(BuilderDetail { builder, houses })
    }

    pub fn create_builder(&self, input: BuilderInput) -> Result<HouseBuilder, ServiceError> {
        let fields = builder_fields(input)?;
        let created = self.builders.insert_builder(&fields)?;
        info!(id = created.id.0, slug = %created.slug, "builder created");
        Ok(created)
    }

    pub fn update_builder(
        &self,
        id: BuilderId,
        input: BuilderInput,
    ) -> Result<HouseBuilder, ServiceError> {
        let fields = builder_fields(input)?;
        let updated = self.builders.update_builder(id, &fields)?;
        info!(id = id.0, slug = %updated.slug, "builder updated");
        Ok(updated)
    }

    pub fn delete_builder(&self, id: BuilderId) -> Result<(), ServiceError> {
        self.builders.delete_builder(id)?;
        info!(id = id.0, "builder deleted");
        Ok(())
    }

    pub fn list_houses(&self, builder: BuilderId) -> Result<Vec<House>, ServiceError> {
        self.builders
            .fetch_builder(builder)?
            .ok_or(ServiceError::NotFound("builder"))?;
        Ok(self.builders.list_houses(Some(builder))?)
    }

    pub fn get_house(&self, id: HouseId) -> Result<House, ServiceError> {
        self.builders
            .fetch_house(id)?
            .ok_or(ServiceError::NotFound("house"))
    }

    pub fn create_house(
        &self,
        builder: BuilderId,
        input: HouseInput,
    ) -> Result<House, ServiceError> {
        self.builders
            .fetch_builder(builder)?
            .ok_or(ServiceError::NotFound("builder"))?;
        let fields = house_fields(builder, input)?;
        let created = self.builders.insert_house(&fields)?;
        info!(id = created.id.0, builder = builder.0, "house created");
        Ok(created)
    }

    /// Houses keep their builder; only the listing details change.
    pub fn update_house(&self, id: HouseId, input: HouseInput) -> Result<House, ServiceError> {
        let existing = self.get_house(id)?;
        let fields = house_fields(existing.builder_id, input)?;
        let updated = self.builders.update_house(id, &fields)?;
        info!(id = id.0, status = updated.status.label(), "house updated");
        Ok(updated)
    }

    pub fn delete_house(&self, id: HouseId) -> Result<(), ServiceError> {
        self.builders.delete_house(id)?;
        info!(id = id.0, "house deleted");
        Ok(())
    }
}

fn builder_fields(input: BuilderInput) -> Result<BuilderFields, ValidationErrors> {
    let mut validator = Validator::new();
    validator
        .required("name", &input.name, MAX_NAME_LEN)
        .max_len("location", input.location.as_deref(), MAX_NAME_LEN)
        .optional_url("website", input.website.as_deref())
        .optional_email("email", input.email.as_deref())
        .optional_phone("phone", input.phone.as_deref())
        .max_len("description", input.description.as_deref(), MAX_TEXT_LEN);

    let slug = slug::resolve(input.slug.as_deref(), &input.name);
    validator.slug("slug", &slug).finish()?;

    Ok(BuilderFields {
        name: input.name.trim().to_string(),
        slug,
        location: clean(input.location),
        website: clean(input.website),
        email: clean(input.email),
        phone: clean(input.phone),
        description: clean(input.description),
    })
}

fn house_fields(builder_id: BuilderId, input: HouseInput) -> Result<HouseFields, ValidationErrors> {
    let images: Vec<String> = input
        .images
        .into_iter()
        .map(|image| image.trim().to_string())
        .filter(|image| !image.is_empty())
        .collect();

    let mut validator = Validator::new();
    validator
        .required("title", &input.title, MAX_NAME_LEN)
        .max_len("address", input.address.as_deref(), MAX_NAME_LEN)
        .range("bedrooms", input.bedrooms, 0, 20)
        .range("bathrooms", input.bathrooms, 0.0, 20.0)
        .range("square_feet", input.square_feet, 1, 20_000)
        .urls("images", &images);
    if input.price == 0 {
        validator.fail("price", "must be greater than zero");
    } else if input.price > MAX_PRICE {
        validator.fail("price", format!("must be at most {MAX_PRICE}"));
    }
    validator.finish()?;

    Ok(HouseFields {
        builder_id,
        title: input.title.trim().to_string(),
        address: clean(input.address),
        price: input.price,
        bedrooms: input.bedrooms,
        bathrooms: input.bathrooms,
        square_feet: input.square_feet,
        status: input.status,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::HouseStatus;

    #[test]
    fn house_price_must_be_positive() {
        let errors = house_fields(
            BuilderId(1),
            HouseInput {
                title: "Lot 4".to_string(),
                ..HouseInput::default()
            },
        )
        .expect_err("zero price");
        assert_eq!(errors.get("price"), Some("must be greater than zero"));
    }

    #[test]
    fn house_fields_keep_status_and_trim_images() {
        let fields = house_fields(
            BuilderId(2),
            HouseInput {
                title: " Juniper Ridge ".to_string(),
                price: 485_000,
                status: HouseStatus::Pending,
                images: vec![" /uploads/a.jpg ".to_string(), " ".to_string()],
                ..HouseInput::default()
            },
        )
        .expect("valid house");
        assert_eq!(fields.title, "Juniper Ridge");
        assert_eq!(fields.status, HouseStatus::Pending);
        assert_eq!(fields.images, ["/uploads/a.jpg"]);
    }

    #[test]
    fn builder_fields_validate_contact_formats() {
        let errors = builder_fields(BuilderInput {
            name: "High Desert Builders".to_string(),
            email: Some("office@".to_string()),
            phone: Some("12".to_string()),
            ..BuilderInput::default()
        })
        .expect_err("bad contact");
        assert!(errors.get("email").is_some());
        assert!(errors.get("phone").is_some());
        assert!(errors.get("slug").is_none());
    }
}
