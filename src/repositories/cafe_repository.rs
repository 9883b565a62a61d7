use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue, Select};
use aws_sdk_dynamodb::{Client as DynamoDbClient, Error as DynamoDbError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::models::{Cafe, CreateCafeRequest, RepositoryError, RepositoryResult};

/// Item id reserved for the atomic id counter. Scans exclude it.
const COUNTER_ID: i64 = 0;

/// Trait defining the interface for cafe data access operations
#[async_trait]
pub trait CafeRepository: Send + Sync {
    /// Enumerate every cafe record
    async fn find_all(&self) -> RepositoryResult<Vec<Cafe>>;

    /// Find cafes whose location is an exact match
    async fn find_by_location(&self, location: &str) -> RepositoryResult<Vec<Cafe>>;

    /// Find a cafe by its unique name
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Cafe>>;

    /// Insert a new cafe, assigning its id
    async fn insert(&self, request: CreateCafeRequest) -> RepositoryResult<Cafe>;

    /// Overwrite the coffee price of an existing cafe
    async fn update_price(&self, id: i64, new_price: Option<String>) -> RepositoryResult<()>;

    /// Delete a cafe by id
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

/// DynamoDB implementation of the CafeRepository trait
pub struct DynamoDbCafeRepository {
    client: Arc<DynamoDbClient>,
    table_name: String,
    location_index: String,
    name_index: String,
}

impl DynamoDbCafeRepository {
    /// Create a new DynamoDB cafe repository
    pub fn new(client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            client,
            table_name,
            location_index: "LocationIndex".to_string(),
            name_index: "NameIndex".to_string(),
        }
    }

    /// Get the table name (for testing)
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Convert a Cafe struct to DynamoDB attribute values
    pub fn cafe_to_item(&self, cafe: &Cafe) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();

        item.insert("id".to_string(), AttributeValue::N(cafe.id.to_string()));
        item.insert("name".to_string(), AttributeValue::S(cafe.name.clone()));
        item.insert(
            "map_url".to_string(),
            AttributeValue::S(cafe.map_url.clone()),
        );
        item.insert(
            "img_url".to_string(),
            AttributeValue::S(cafe.img_url.clone()),
        );
        item.insert(
            "location".to_string(),
            AttributeValue::S(cafe.location.clone()),
        );
        item.insert("seats".to_string(), AttributeValue::S(cafe.seats.clone()));
        item.insert(
            "has_toilet".to_string(),
            AttributeValue::Bool(cafe.has_toilet),
        );
        item.insert("has_wifi".to_string(), AttributeValue::Bool(cafe.has_wifi));
        item.insert(
            "has_sockets".to_string(),
            AttributeValue::Bool(cafe.has_sockets),
        );
        item.insert(
            "can_take_calls".to_string(),
            AttributeValue::Bool(cafe.can_take_calls),
        );

        // coffee_price is the one nullable column
        if let Some(ref price) = cafe.coffee_price {
            item.insert("coffee_price".to_string(), AttributeValue::S(price.clone()));
        }

        item
    }

    /// Convert a DynamoDB item to a Cafe struct
    pub fn item_to_cafe(&self, item: HashMap<String, AttributeValue>) -> RepositoryResult<Cafe> {
        let id = item
            .get("id")
            .and_then(|v| v.as_n().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| RepositoryError::InvalidItem {
                message: "Missing or invalid id".to_string(),
            })?;

        let name = get_string(&item, "name")?;
        let map_url = get_string(&item, "map_url")?;
        let img_url = get_string(&item, "img_url")?;
        let location = get_string(&item, "location")?;
        let seats = get_string(&item, "seats")?;

        let has_toilet = get_bool(&item, "has_toilet")?;
        let has_wifi = get_bool(&item, "has_wifi")?;
        let has_sockets = get_bool(&item, "has_sockets")?;
        let can_take_calls = get_bool(&item, "can_take_calls")?;

        let coffee_price = item
            .get("coffee_price")
            .and_then(|v| v.as_s().ok())
            .cloned();

        Ok(Cafe {
            id,
            name,
            map_url,
            img_url,
            location,
            seats,
            has_toilet,
            has_wifi,
            has_sockets,
            can_take_calls,
            coffee_price,
        })
    }

    /// Allocate the next record id from the counter item
    async fn next_id(&self) -> RepositoryResult<i64> {
        let response = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::N(COUNTER_ID.to_string()))
            .update_expression("ADD next_id :one")
            .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| self.map_dynamodb_error(e.into()))?;

        response
            .attributes()
            .and_then(|attrs| attrs.get("next_id"))
            .and_then(|v| v.as_n().ok())
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| RepositoryError::InvalidItem {
                message: "Counter item returned no usable next_id".to_string(),
            })
    }

    /// Convert a DynamoDB error to a RepositoryError
    fn map_dynamodb_error(&self, error: DynamoDbError) -> RepositoryError {
        error!("DynamoDB error: {:?}", error);

        match error {
            DynamoDbError::ResourceNotFoundException(_) => RepositoryError::TableNotFound {
                table_name: self.table_name.clone(),
            },
            other => RepositoryError::AwsSdk {
                message: other.to_string(),
            },
        }
    }

    fn parse_items(&self, items: Option<Vec<HashMap<String, AttributeValue>>>) -> Vec<Cafe> {
        let mut cafes = Vec::new();
        if let Some(items) = items {
            for item in items {
                match self.item_to_cafe(item) {
                    Ok(cafe) => cafes.push(cafe),
                    Err(e) => {
                        warn!("Failed to parse cafe item: {}", e);
                        continue;
                    }
                }
            }
        }
        cafes
    }
}

fn get_string(
    item: &HashMap<String, AttributeValue>,
    attribute: &str,
) -> RepositoryResult<String> {
    item.get(attribute)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| RepositoryError::InvalidItem {
            message: format!("Missing {}", attribute),
        })
}

fn get_bool(item: &HashMap<String, AttributeValue>, attribute: &str) -> RepositoryResult<bool> {
    item.get(attribute)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| RepositoryError::InvalidItem {
            message: format!("Missing {}", attribute),
        })
}

#[async_trait]
impl CafeRepository for DynamoDbCafeRepository {
    #[instrument(skip(self), fields(table = %self.table_name))]
    async fn find_all(&self) -> RepositoryResult<Vec<Cafe>> {
        info!("Scanning all cafes");

        let response = self
            .client
            .scan()
            .table_name(&self.table_name)
            .select(Select::AllAttributes)
            .filter_expression("id <> :counter")
            .expression_attribute_values(":counter", AttributeValue::N(COUNTER_ID.to_string()))
            .send()
            .await
            .map_err(|e| self.map_dynamodb_error(e.into()))?;

        let cafes = self.parse_items(response.items);
        info!("Found {} cafes", cafes.len());
        Ok(cafes)
    }

    #[instrument(skip(self), fields(table = %self.table_name, location = %location))]
    async fn find_by_location(&self, location: &str) -> RepositoryResult<Vec<Cafe>> {
        info!("Querying cafes by location");

        // "location" is a DynamoDB reserved word
        let response = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.location_index)
            .key_condition_expression("#loc = :location")
            .expression_attribute_names("#loc", "location")
            .expression_attribute_values(":location", AttributeValue::S(location.to_string()))
            .send()
            .await
            .map_err(|e| self.map_dynamodb_error(e.into()))?;

        let cafes = self.parse_items(response.items);
        info!("Found {} cafes at location {}", cafes.len(), location);
        Ok(cafes)
    }

    #[instrument(skip(self), fields(table = %self.table_name, name = %name))]
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Cafe>> {
        info!("Querying cafe by name");

        let response = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.name_index)
            .key_condition_expression("#name = :name")
            .expression_attribute_names("#name", "name")
            .expression_attribute_values(":name", AttributeValue::S(name.to_string()))
            .send()
            .await
            .map_err(|e| self.map_dynamodb_error(e.into()))?;

        let cafe = response
            .items
            .and_then(|items| items.into_iter().next())
            .map(|item| self.item_to_cafe(item))
            .transpose()?;

        Ok(cafe)
    }

    #[instrument(skip(self, request), fields(table = %self.table_name, name = %request.name))]
    async fn insert(&self, request: CreateCafeRequest) -> RepositoryResult<Cafe> {
        info!("Inserting new cafe");

        let id = self.next_id().await?;
        let cafe = Cafe::new(id, request);
        let item = self.cafe_to_item(&cafe);

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| self.map_dynamodb_error(e.into()))?;

        info!("Cafe inserted with id {}", cafe.id);
        Ok(cafe)
    }

    #[instrument(skip(self, new_price), fields(table = %self.table_name, id = %id))]
    async fn update_price(&self, id: i64, new_price: Option<String>) -> RepositoryResult<()> {
        info!("Updating coffee price");

        let price = match new_price {
            Some(p) => AttributeValue::S(p),
            None => AttributeValue::Null(true),
        };

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::N(id.to_string()))
            .update_expression("SET coffee_price = :price")
            .expression_attribute_values(":price", price)
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let e: DynamoDbError = e.into();
                match e {
                    DynamoDbError::ConditionalCheckFailedException(_) => RepositoryError::NotFound,
                    other => self.map_dynamodb_error(other),
                }
            })?;

        info!("Coffee price updated");
        Ok(())
    }

    #[instrument(skip(self), fields(table = %self.table_name, id = %id))]
    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        info!("Deleting cafe");

        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::N(id.to_string()))
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| {
                let e: DynamoDbError = e.into();
                match e {
                    DynamoDbError::ConditionalCheckFailedException(_) => RepositoryError::NotFound,
                    other => self.map_dynamodb_error(other),
                }
            })?;

        info!("Cafe deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateCafeRequest;

    fn create_test_client() -> Arc<DynamoDbClient> {
        let config = aws_sdk_dynamodb::Config::builder()
            .region(aws_sdk_dynamodb::config::Region::new("us-east-1"))
            .behavior_version(aws_sdk_dynamodb::config::BehaviorVersion::latest())
            .build();
        Arc::new(DynamoDbClient::from_conf(config))
    }

    fn create_test_repo() -> DynamoDbCafeRepository {
        DynamoDbCafeRepository::new(create_test_client(), "test-cafes".to_string())
    }

    fn create_test_cafe() -> Cafe {
        Cafe::new(
            1,
            CreateCafeRequest {
                name: "Science Gallery London".to_string(),
                map_url: "https://g.page/scigallerylon".to_string(),
                img_url: "https://example.com/sgl.jpg".to_string(),
                location: "London Bridge".to_string(),
                seats: "50+".to_string(),
                has_toilet: true,
                has_wifi: true,
                has_sockets: true,
                can_take_calls: false,
                coffee_price: Some("£2.40".to_string()),
            },
        )
    }

    #[test]
    fn test_cafe_to_item_conversion() {
        let cafe = create_test_cafe();
        let repo = create_test_repo();

        let item = repo.cafe_to_item(&cafe);

        assert!(item.contains_key("id"));
        assert!(item.contains_key("name"));
        assert!(item.contains_key("location"));
        assert!(item.contains_key("coffee_price"));

        if let Some(AttributeValue::N(id)) = item.get("id") {
            assert_eq!(id, "1");
        } else {
            panic!("Expected number value for id");
        }

        if let Some(AttributeValue::Bool(calls)) = item.get("can_take_calls") {
            assert!(!calls);
        } else {
            panic!("Expected boolean value for can_take_calls");
        }
    }

    #[test]
    fn test_cafe_to_item_omits_absent_price() {
        let mut cafe = create_test_cafe();
        cafe.coffee_price = None;
        let repo = create_test_repo();

        let item = repo.cafe_to_item(&cafe);
        assert!(!item.contains_key("coffee_price"));
    }

    #[test]
    fn test_item_to_cafe_conversion() {
        let cafe = create_test_cafe();
        let repo = create_test_repo();

        let item = repo.cafe_to_item(&cafe);
        let converted = repo.item_to_cafe(item).unwrap();

        assert_eq!(converted, cafe);
    }

    #[test]
    fn test_item_to_cafe_missing_required_attribute() {
        let cafe = create_test_cafe();
        let repo = create_test_repo();

        let mut item = repo.cafe_to_item(&cafe);
        item.remove("location");

        let result = repo.item_to_cafe(item);
        match result {
            Err(RepositoryError::InvalidItem { message }) => {
                assert!(message.contains("location"));
            }
            other => panic!("Expected InvalidItem error, got {:?}", other),
        }
    }

    #[test]
    fn test_repository_creation() {
        let repo = create_test_repo();

        assert_eq!(repo.table_name(), "test-cafes");
        assert_eq!(repo.location_index, "LocationIndex");
        assert_eq!(repo.name_index, "NameIndex");
    }
}
