use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::Utc;

use retailforge_catalog::{
    Attribute, AttributeId, AttributeValue, AttributeValueId, Company, NewAttribute,
    NewAttributeValue, NewCategory, NewCompany, NewProductTemplate, ProductCategory,
    ProductTemplate, ProductVariant, TemplateId, VariantCreation, VariantId, VariantUpdate,
    expand_combinations, match_by_name,
};
use retailforge_catalog::{AttributeLine, CategoryId};
use retailforge_core::{CompanyId, Entity, PartnerId};
use retailforge_loyalty::{
    CardId, LoyaltyCard, LoyaltyProgram, NewLoyaltyCard, NewLoyaltyProgram, ProgramId, generate_code,
};

use crate::repository::{
    CatalogRepository, LoyaltyRepository, RepoResult, RepositoryError, Store, UnitOfWork,
};

/// Committed contents of the store. Records keep insertion order.
#[derive(Debug, Clone, Default)]
struct StoreState {
    /// Bumped on every commit that changed something.
    version: u64,
    companies: Vec<Company>,
    categories: Vec<ProductCategory>,
    attributes: Vec<Attribute>,
    attribute_values: Vec<AttributeValue>,
    templates: Vec<ProductTemplate>,
    variants: Vec<ProductVariant>,
    /// Barcode → owning variant; kept in step with `variants`.
    barcodes: HashMap<String, VariantId>,
    programs: Vec<LoyaltyProgram>,
    cards: Vec<LoyaltyCard>,
}

/// In-memory store with snapshot units of work.
///
/// Intended for tests/dev. `begin` clones the committed state; `commit`
/// swaps the working copy in if nobody else committed in between
/// (optimistic concurrency), otherwise it fails with a conflict.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Version of the committed state (number of effective commits).
    pub fn version(&self) -> RepoResult<u64> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.version)
    }
}

impl Store for InMemoryStore {
    type UnitOfWork = InMemoryUnitOfWork;

    fn begin(&self) -> RepoResult<Self::UnitOfWork> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(InMemoryUnitOfWork {
            shared: Arc::clone(&self.state),
            base_version: state.version,
            working: state.clone(),
            dirty: false,
        })
    }
}

/// Working copy of the store for one unit of work.
#[derive(Debug)]
pub struct InMemoryUnitOfWork {
    shared: Arc<RwLock<StoreState>>,
    base_version: u64,
    working: StoreState,
    dirty: bool,
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn commit(self) -> RepoResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let mut shared = self.shared.write().map_err(|_| poisoned())?;
        if shared.version != self.base_version {
            return Err(RepositoryError::Conflict(format!(
                "store changed since unit of work began (expected version {}, found {})",
                self.base_version, shared.version
            )));
        }

        let mut working = self.working;
        working.version = self.base_version + 1;
        *shared = working;
        Ok(())
    }

    fn rollback(self) {
        tracing::debug!(dirty = self.dirty, "unit of work rolled back");
    }
}

fn by_id<'a, T: Entity>(records: &'a [T], id: &T::Id) -> Option<&'a T> {
    records.iter().find(|r| r.id() == id)
}

fn by_id_mut<'a, T: Entity>(records: &'a mut [T], id: &T::Id) -> Option<&'a mut T> {
    records.iter_mut().find(|r| r.id() == id)
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_string())
}

impl InMemoryUnitOfWork {
    fn ensure_company(&self, id: CompanyId) -> RepoResult<()> {
        if by_id(&self.working.companies, &id).is_some() {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("company {id}")))
        }
    }

    fn ensure_category(&self, id: CategoryId) -> RepoResult<()> {
        if by_id(&self.working.categories, &id).is_some() {
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("product category {id}")))
        }
    }

    /// Check that every line references a known attribute and only its own values.
    fn ensure_lines(&self, lines: &[AttributeLine]) -> RepoResult<()> {
        for line in lines {
            if by_id(&self.working.attributes, &line.attribute_id).is_none() {
                return Err(RepositoryError::NotFound(format!("attribute {}", line.attribute_id)));
            }
            for value_id in &line.value_ids {
                let value = by_id(&self.working.attribute_values, value_id)
                    .ok_or_else(|| RepositoryError::NotFound(format!("attribute value {value_id}")))?;
                if value.attribute_id != line.attribute_id {
                    return Err(RepositoryError::Invalid(format!(
                        "value '{}' does not belong to attribute {}",
                        value.name, line.attribute_id
                    )));
                }
            }
        }
        Ok(())
    }

    fn creates_variants_eagerly(&self, attribute_id: AttributeId) -> bool {
        by_id(&self.working.attributes, &attribute_id)
            .map(|a| a.variant_creation == VariantCreation::Always)
            .unwrap_or(false)
    }
}

impl CatalogRepository for InMemoryUnitOfWork {
    fn create_company(&mut self, request: NewCompany) -> RepoResult<Company> {
        request.validate()?;
        let name = request.name.trim().to_string();
        if self.working.companies.iter().any(|c| c.name.eq_ignore_ascii_case(&name)) {
            return Err(RepositoryError::Conflict(format!("company '{name}' already exists")));
        }

        let company = Company {
            id: CompanyId::new(),
            name,
        };
        self.working.companies.push(company.clone());
        self.dirty = true;
        Ok(company)
    }

    fn find_company_by_name(&self, name: &str) -> RepoResult<Option<Company>> {
        Ok(match_by_name(&self.working.companies, |c| c.name.as_str(), name).cloned())
    }

    fn create_category(&mut self, request: NewCategory) -> RepoResult<ProductCategory> {
        request.validate()?;
        let category = ProductCategory {
            id: CategoryId::new(),
            name: request.name.trim().to_string(),
        };
        self.working.categories.push(category.clone());
        self.dirty = true;
        Ok(category)
    }

    fn find_category_by_name(&self, name: &str) -> RepoResult<Option<ProductCategory>> {
        Ok(match_by_name(&self.working.categories, |c| c.name.as_str(), name).cloned())
    }

    fn find_attribute_by_name(&self, name: &str) -> RepoResult<Option<Attribute>> {
        Ok(self.working.attributes.iter().find(|a| a.name == name).cloned())
    }

    fn create_attribute(&mut self, request: NewAttribute) -> RepoResult<Attribute> {
        request.validate()?;
        if self.working.attributes.iter().any(|a| a.name == request.name) {
            return Err(RepositoryError::Conflict(format!(
                "attribute '{}' already exists",
                request.name
            )));
        }

        let attribute = Attribute {
            id: AttributeId::new(),
            name: request.name,
            variant_creation: request.variant_creation,
        };
        self.working.attributes.push(attribute.clone());
        self.dirty = true;
        Ok(attribute)
    }

    fn set_variant_creation(&mut self, id: AttributeId, mode: VariantCreation) -> RepoResult<Attribute> {
        let attribute = by_id_mut(&mut self.working.attributes, &id)
            .ok_or_else(|| RepositoryError::NotFound(format!("attribute {id}")))?;

        if attribute.variant_creation != mode {
            attribute.variant_creation = mode;
            self.dirty = true;
        }
        Ok(attribute.clone())
    }

    fn attribute_value(&self, id: AttributeValueId) -> RepoResult<Option<AttributeValue>> {
        Ok(by_id(&self.working.attribute_values, &id).cloned())
    }

    fn find_attribute_value(&self, attribute_id: AttributeId, name: &str) -> RepoResult<Option<AttributeValue>> {
        Ok(self
            .working
            .attribute_values
            .iter()
            .find(|v| v.attribute_id == attribute_id && v.name == name)
            .cloned())
    }

    fn attribute_values(&self, attribute_id: AttributeId) -> RepoResult<Vec<AttributeValue>> {
        Ok(self
            .working
            .attribute_values
            .iter()
            .filter(|v| v.attribute_id == attribute_id)
            .cloned()
            .collect())
    }

    fn create_attribute_value(&mut self, request: NewAttributeValue) -> RepoResult<AttributeValue> {
        request.validate()?;
        if by_id(&self.working.attributes, &request.attribute_id).is_none() {
            return Err(RepositoryError::NotFound(format!("attribute {}", request.attribute_id)));
        }
        if self.find_attribute_value(request.attribute_id, &request.name)?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "value '{}' already exists on attribute {}",
                request.name, request.attribute_id
            )));
        }

        let value = AttributeValue {
            id: AttributeValueId::new(),
            attribute_id: request.attribute_id,
            name: request.name,
        };
        self.working.attribute_values.push(value.clone());
        self.dirty = true;
        Ok(value)
    }

    fn create_template(&mut self, request: NewProductTemplate) -> RepoResult<ProductTemplate> {
        request.validate()?;
        if let Some(company_id) = request.company_id {
            self.ensure_company(company_id)?;
        }
        if let Some(category_id) = request.category_id {
            self.ensure_category(category_id)?;
        }
        self.ensure_lines(&request.attribute_lines)?;

        let template = ProductTemplate {
            id: TemplateId::new(),
            name: request.name,
            product_type: request.product_type,
            default_code: request.default_code,
            list_price: request.list_price,
            attribute_lines: request.attribute_lines,
            company_id: request.company_id,
            category_id: request.category_id,
            created_at: Utc::now(),
        };

        let variant_lines: Vec<AttributeLine> = template
            .attribute_lines
            .iter()
            .filter(|line| self.creates_variants_eagerly(line.attribute_id))
            .cloned()
            .collect();

        for value_ids in expand_combinations(&variant_lines) {
            self.working.variants.push(ProductVariant {
                id: VariantId::new(),
                template_id: template.id,
                value_ids,
                default_code: None,
                barcode: None,
            });
        }

        self.working.templates.push(template.clone());
        self.dirty = true;
        Ok(template)
    }

    fn template(&self, id: TemplateId) -> RepoResult<Option<ProductTemplate>> {
        Ok(by_id(&self.working.templates, &id).cloned())
    }

    fn templates(&self) -> RepoResult<Vec<ProductTemplate>> {
        Ok(self.working.templates.clone())
    }

    fn variants_of(&self, template_id: TemplateId) -> RepoResult<Vec<ProductVariant>> {
        Ok(self
            .working
            .variants
            .iter()
            .filter(|v| v.template_id == template_id)
            .cloned()
            .collect())
    }

    fn update_variant(&mut self, id: VariantId, update: VariantUpdate) -> RepoResult<ProductVariant> {
        if let Some(barcode) = &update.barcode {
            if self.working.barcodes.get(barcode).is_some_and(|owner| *owner != id) {
                return Err(RepositoryError::Conflict(format!(
                    "barcode '{barcode}' is already assigned to another variant"
                )));
            }
        }

        let variant = by_id_mut(&mut self.working.variants, &id)
            .ok_or_else(|| RepositoryError::NotFound(format!("variant {id}")))?;

        if let Some(barcode) = &update.barcode {
            if let Some(previous) = variant.barcode.as_ref().filter(|old| *old != barcode) {
                self.working.barcodes.remove(previous);
            }
            self.working.barcodes.insert(barcode.clone(), id);
        }

        if !update.is_empty() {
            update.apply_to(variant);
            self.dirty = true;
        }
        Ok(variant.clone())
    }
}

impl LoyaltyRepository for InMemoryUnitOfWork {
    fn create_program(&mut self, request: NewLoyaltyProgram) -> RepoResult<LoyaltyProgram> {
        request.validate()?;
        let program = LoyaltyProgram {
            id: ProgramId::new(),
            name: request.name.trim().to_string(),
            first_time_only: request.first_time_only,
        };
        self.working.programs.push(program.clone());
        self.dirty = true;
        Ok(program)
    }

    fn program(&self, id: ProgramId) -> RepoResult<Option<LoyaltyProgram>> {
        Ok(by_id(&self.working.programs, &id).cloned())
    }

    fn count_cards(&self, partner_id: PartnerId, program_id: ProgramId) -> RepoResult<usize> {
        Ok(self
            .working
            .cards
            .iter()
            .filter(|c| c.partner_id == Some(partner_id) && c.program_id == program_id)
            .count())
    }

    fn create_cards(&mut self, requests: Vec<NewLoyaltyCard>) -> RepoResult<Vec<LoyaltyCard>> {
        let mut created: Vec<LoyaltyCard> = Vec::with_capacity(requests.len());

        for request in requests {
            if by_id(&self.working.programs, &request.program_id).is_none() {
                return Err(RepositoryError::NotFound(format!("loyalty program {}", request.program_id)));
            }

            let id = CardId::new();
            let code = request
                .code
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| generate_code(&id));

            let in_use = self.working.cards.iter().chain(created.iter()).any(|c| c.code == code);
            if in_use {
                return Err(RepositoryError::Conflict(format!("card code '{code}' is already in use")));
            }

            created.push(LoyaltyCard {
                id,
                program_id: request.program_id,
                partner_id: request.partner_id,
                code,
                points: request.points,
                created_at: Utc::now(),
            });
        }

        if !created.is_empty() {
            self.working.cards.extend(created.iter().cloned());
            self.dirty = true;
        }
        Ok(created)
    }

    fn cards_of_program(&self, program_id: ProgramId) -> RepoResult<Vec<LoyaltyCard>> {
        Ok(self
            .working
            .cards
            .iter()
            .filter(|c| c.program_id == program_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retailforge_catalog::ProductType;

    fn template_request(name: &str, lines: Vec<AttributeLine>) -> NewProductTemplate {
        NewProductTemplate {
            name: name.to_string(),
            product_type: ProductType::Consumable,
            default_code: None,
            list_price: 0,
            attribute_lines: lines,
            company_id: None,
            category_id: None,
        }
    }

    fn attribute_with_values(uow: &mut InMemoryUnitOfWork, name: &str, values: &[&str]) -> AttributeLine {
        let attribute = uow
            .create_attribute(NewAttribute {
                name: name.to_string(),
                variant_creation: VariantCreation::Always,
            })
            .unwrap();
        let value_ids = values
            .iter()
            .map(|v| {
                uow.create_attribute_value(NewAttributeValue {
                    attribute_id: attribute.id,
                    name: v.to_string(),
                })
                .unwrap()
                .id
            })
            .collect();
        AttributeLine {
            attribute_id: attribute.id,
            value_ids,
        }
    }

    #[test]
    fn uncommitted_changes_are_invisible_and_discarded() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().unwrap();
        uow.create_company(NewCompany { name: "Acme".to_string() }).unwrap();
        uow.rollback();

        let uow = store.begin().unwrap();
        assert!(uow.find_company_by_name("Acme").unwrap().is_none());
        assert_eq!(store.version().unwrap(), 0);
    }

    #[test]
    fn commit_publishes_changes() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().unwrap();
        uow.create_company(NewCompany { name: "Acme".to_string() }).unwrap();
        uow.commit().unwrap();

        let uow = store.begin().unwrap();
        assert_eq!(uow.find_company_by_name("acme").unwrap().unwrap().name, "Acme");
        assert_eq!(store.version().unwrap(), 1);
    }

    #[test]
    fn stale_commit_is_rejected() {
        let store = InMemoryStore::new();

        let mut first = store.begin().unwrap();
        let mut second = store.begin().unwrap();
        first.create_category(NewCategory { name: "Shirts".to_string() }).unwrap();
        second.create_category(NewCategory { name: "Shoes".to_string() }).unwrap();

        first.commit().unwrap();
        let err = second.commit().unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn read_only_unit_of_work_never_conflicts() {
        let store = InMemoryStore::new();

        let reader = store.begin().unwrap();
        let mut writer = store.begin().unwrap();
        writer.create_company(NewCompany { name: "Acme".to_string() }).unwrap();
        writer.commit().unwrap();

        assert!(reader.commit().is_ok());
    }

    #[test]
    fn template_expands_one_variant_per_combination() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let colors = attribute_with_values(&mut uow, "Color", &["Red", "Blue"]);
        let sizes = attribute_with_values(&mut uow, "Size", &["S", "M", "L"]);
        let template = uow.create_template(template_request("Tee", vec![colors, sizes])).unwrap();

        let variants = uow.variants_of(template.id).unwrap();
        assert_eq!(variants.len(), 6);
        assert!(variants.iter().all(|v| v.default_code.is_none() && v.barcode.is_none()));
    }

    #[test]
    fn template_without_lines_gets_single_variant() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let template = uow.create_template(template_request("Gift wrap", vec![])).unwrap();
        let variants = uow.variants_of(template.id).unwrap();
        assert_eq!(variants.len(), 1);
        assert!(variants[0].value_ids.is_empty());
    }

    #[test]
    fn non_eager_attributes_do_not_multiply_variants() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let colors = attribute_with_values(&mut uow, "Color", &["Red", "Blue"]);
        let material = attribute_with_values(&mut uow, "Material", &["Cotton", "Linen"]);
        uow.set_variant_creation(material.attribute_id, VariantCreation::NoVariant).unwrap();

        let template = uow.create_template(template_request("Tee", vec![colors, material])).unwrap();
        assert_eq!(uow.variants_of(template.id).unwrap().len(), 2);
    }

    #[test]
    fn template_rejects_value_from_another_attribute() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let colors = attribute_with_values(&mut uow, "Color", &["Red"]);
        let sizes = attribute_with_values(&mut uow, "Size", &["M"]);
        let mixed = AttributeLine {
            attribute_id: colors.attribute_id,
            value_ids: sizes.value_ids,
        };

        let err = uow.create_template(template_request("Tee", vec![mixed])).unwrap_err();
        assert!(matches!(err, RepositoryError::Invalid(_)));
    }

    #[test]
    fn attribute_values_are_unique_per_attribute() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let colors = attribute_with_values(&mut uow, "Color", &["Red"]);
        let err = uow
            .create_attribute_value(NewAttributeValue {
                attribute_id: colors.attribute_id,
                name: "Red".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn barcodes_are_unique_across_variants() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let colors = attribute_with_values(&mut uow, "Color", &["Red", "Blue"]);
        let template = uow.create_template(template_request("Tee", vec![colors])).unwrap();
        let variants = uow.variants_of(template.id).unwrap();

        let update = VariantUpdate {
            default_code: None,
            barcode: Some("4006381333931".to_string()),
        };
        uow.update_variant(variants[0].id, update.clone()).unwrap();
        // Re-writing the same barcode on the same variant is fine.
        uow.update_variant(variants[0].id, update.clone()).unwrap();

        let err = uow.update_variant(variants[1].id, update).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn reassigned_barcode_is_released() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let colors = attribute_with_values(&mut uow, "Color", &["Red", "Blue"]);
        let template = uow.create_template(template_request("Tee", vec![colors])).unwrap();
        let variants = uow.variants_of(template.id).unwrap();
        let barcode = |code: &str| VariantUpdate {
            default_code: None,
            barcode: Some(code.to_string()),
        };

        uow.update_variant(variants[0].id, barcode("111")).unwrap();
        uow.update_variant(variants[0].id, barcode("222")).unwrap();

        let taken = uow.update_variant(variants[1].id, barcode("111")).unwrap();
        assert_eq!(taken.barcode.as_deref(), Some("111"));
        let err = uow.update_variant(variants[1].id, barcode("222")).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn barcode_index_survives_commit() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();
        let colors = attribute_with_values(&mut uow, "Color", &["Red", "Blue"]);
        let template = uow.create_template(template_request("Tee", vec![colors])).unwrap();
        let variants = uow.variants_of(template.id).unwrap();
        let update = VariantUpdate {
            default_code: None,
            barcode: Some("4006381333931".to_string()),
        };
        uow.update_variant(variants[0].id, update.clone()).unwrap();
        uow.commit().unwrap();

        let mut uow = store.begin().unwrap();
        let err = uow.update_variant(variants[1].id, update).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn cards_require_known_program_and_unique_code() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let unknown = uow
            .create_cards(vec![NewLoyaltyCard {
                program_id: ProgramId::new(),
                partner_id: None,
                code: None,
                points: 0,
            }])
            .unwrap_err();
        assert!(matches!(unknown, RepositoryError::NotFound(_)));

        let program = uow
            .create_program(NewLoyaltyProgram {
                name: "Welcome".to_string(),
                first_time_only: false,
            })
            .unwrap();
        let request = NewLoyaltyCard {
            program_id: program.id,
            partner_id: None,
            code: Some("WELCOME-1".to_string()),
            points: 10,
        };
        let duplicate = uow.create_cards(vec![request.clone(), request]).unwrap_err();
        assert!(matches!(duplicate, RepositoryError::Conflict(_)));
        assert!(uow.cards_of_program(program.id).unwrap().is_empty());
    }

    #[test]
    fn count_cards_is_scoped_to_partner_and_program() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().unwrap();

        let program = uow
            .create_program(NewLoyaltyProgram {
                name: "Welcome".to_string(),
                first_time_only: true,
            })
            .unwrap();
        let other = uow
            .create_program(NewLoyaltyProgram {
                name: "Summer".to_string(),
                first_time_only: false,
            })
            .unwrap();
        let partner = PartnerId::new();

        let card = |program_id| NewLoyaltyCard {
            program_id,
            partner_id: Some(partner),
            code: None,
            points: 0,
        };
        uow.create_cards(vec![card(program.id), card(other.id), card(other.id)]).unwrap();

        assert_eq!(uow.count_cards(partner, program.id).unwrap(), 1);
        assert_eq!(uow.count_cards(partner, other.id).unwrap(), 2);
        assert_eq!(uow.count_cards(PartnerId::new(), program.id).unwrap(), 0);
    }
}
