//! Template-first outreach packets for a partner the user picked from a search.
//!
//! Nothing is sent from here; the caller prefills its own mail or form client with the result.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use ltc_domain::ranking::spaced;
use ltc_providers::Contact;

use crate::{
	DispositionService, Error, Result,
	search::{LocationInput, SCHEMA_VERSION},
};

pub const APP_NAME: &str = "Legacy Treasure Chest";
pub const OUTREACH_QUESTIONS: [&str; 3] = [
	"Are you currently accepting items in this category?",
	"What is your process and timeline to evaluate/accept items?",
	"Do you provide receipts or itemized records (useful for estate accounting)?",
];
pub const FOLLOW_UPS: [&str; 2] = [
	"If no response in 3 business days, send a brief follow-up.",
	"Confirm pickup logistics, fees/commission, and documentation/receipts.",
];
pub const CONTACT_INSTRUCTIONS: &str = "If the partner has no email, use their website contact form and paste the message body. If neither email nor website is available, call and use the same questions.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
	#[serde(default = "default_schema_version")]
	pub schema_version: u32,
	#[serde(default = "default_scope")]
	pub scope: String,
	pub item_id: String,
	pub plan_id: Option<String>,
	pub partner: PartnerRef,
	pub packet_scope: Option<PacketScope>,
	pub item_summary: ItemSummary,
	pub location: LocationInput,
	/// Sign-off line; the letter ends after "Thank you," when absent.
	pub sender_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRef {
	pub partner_id: String,
	pub name: String,
	pub partner_type: String,
	#[serde(default)]
	pub contact: Contact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PacketScope {
	pub kind: String,
	pub include_photos: bool,
	pub include_inventory_pdf: bool,
	pub include_plan_summary: bool,
}
impl Default for PacketScope {
	fn default() -> Self {
		Self {
			kind: "single_item".to_string(),
			include_photos: true,
			include_inventory_pdf: true,
			include_plan_summary: false,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
	pub title: String,
	pub description: Option<String>,
	pub category: Option<String>,
	pub quantity: Option<u32>,
	pub value_estimate: Option<ValueEstimate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueEstimate {
	#[serde(default = "default_currency_code")]
	pub currency_code: String,
	pub low: Option<f64>,
	pub likely: Option<f64>,
	pub high: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
	Email,
	WebsiteForm,
	Phone,
}
impl ContactMethod {
	pub fn for_contact(contact: &Contact) -> Self {
		let present = |field: &Option<String>| field.as_deref().is_some_and(|v| !v.trim().is_empty());

		if present(&contact.email) {
			Self::Email
		} else if present(&contact.website) {
			Self::WebsiteForm
		} else {
			Self::Phone
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
	InventoryPdf,
	Photos,
	PlanSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
	pub kind: AttachmentKind,
	pub label: String,
	pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
	pub schema_version: u32,
	#[serde(with = "time::serde::rfc3339")]
	pub generated_at: OffsetDateTime,
	pub preferred_contact_method: ContactMethod,
	pub subject: String,
	pub email_body: String,
	pub attachments: Vec<Attachment>,
	pub follow_ups: Vec<String>,
	pub instructions: Option<String>,
}

impl DispositionService {
	pub fn compose_outreach(&self, req: ComposeRequest) -> Result<ComposeResponse> {
		validate_request(&req)?;

		let preferred_contact_method = ContactMethod::for_contact(&req.partner.contact);

		tracing::info!(
			partner_id = %req.partner.partner_id,
			partner_type = %req.partner.partner_type,
			contact_method = ?preferred_contact_method,
			"Outreach composed."
		);

		Ok(ComposeResponse {
			schema_version: SCHEMA_VERSION,
			generated_at: self.clock.now(),
			preferred_contact_method,
			subject: format!(
				"Inquiry: {} ({})",
				req.item_summary.title.trim(),
				req.location.city.trim()
			),
			email_body: email_body(&req),
			attachments: req.packet_scope.as_ref().map(attachments).unwrap_or_default(),
			follow_ups: FOLLOW_UPS.iter().map(|line| line.to_string()).collect(),
			instructions: Some(CONTACT_INSTRUCTIONS.to_string()),
		})
	}
}

pub fn value_line(estimate: Option<&ValueEstimate>) -> String {
	let Some(estimate) = estimate.filter(|estimate| {
		estimate.low.is_some() || estimate.likely.is_some() || estimate.high.is_some()
	}) else {
		return "Estimated value: unknown (happy to provide more details).".to_string();
	};
	let amount = match (estimate.low, estimate.likely, estimate.high) {
		(Some(low), _, Some(high)) => format!("{low:.0}–{high:.0}"),
		(_, Some(likely), _) => format!("{likely:.0}"),
		(Some(low), None, None) => format!("{low:.0}+"),
		_ => "unknown".to_string(),
	};

	format!("Estimated value ({}): {amount}", estimate.currency_code)
}

fn email_body(req: &ComposeRequest) -> String {
	let item = &req.item_summary;
	let category = item.category.as_deref().map(str::trim).filter(|value| !value.is_empty());
	let description = item.description.as_deref().map(str::trim).filter(|value| !value.is_empty());
	let questions =
		OUTREACH_QUESTIONS.iter().map(|question| format!("- {question}")).collect::<Vec<_>>();
	let mut body = format!(
		"Hello {name},\n\n\
		I am using the {APP_NAME} app to catalog estate items and plan next steps.\n\
		I have an item that may be a fit for your {services} services.\n\n\
		Item: {title}\n\
		Category: {category}\n\
		Quantity: {quantity}\n\
		Location: {city}, {region}\n\
		{value}\n\n\
		Details:\n{details}\n\n\
		Questions:\n{questions}\n\n\
		If helpful, I can share a one-page item summary PDF and photos.\n\
		Thank you,\n",
		name = req.partner.name.trim(),
		services = spaced(&req.partner.partner_type),
		title = item.title.trim(),
		category = category.unwrap_or("Unknown"),
		quantity = item.quantity.filter(|quantity| *quantity > 0).unwrap_or(1),
		city = req.location.city.trim(),
		region = req.location.region.trim(),
		value = value_line(item.value_estimate.as_ref()),
		details = description.unwrap_or("(no additional description provided)"),
		questions = questions.join("\n"),
	);

	if let Some(sender) = req.sender_name.as_deref().map(str::trim).filter(|value| !value.is_empty())
	{
		body.push_str(sender);
		body.push('\n');
	}

	body
}

fn attachments(scope: &PacketScope) -> Vec<Attachment> {
	let mut attachments = Vec::with_capacity(3);

	if scope.include_inventory_pdf {
		attachments.push(Attachment {
			kind: AttachmentKind::InventoryPdf,
			label: "LTC_Item_Summary.pdf".to_string(),
			required: true,
		});
	}
	if scope.include_photos {
		attachments.push(Attachment {
			kind: AttachmentKind::Photos,
			label: "Item_Photos.jpg (one or more)".to_string(),
			required: false,
		});
	}
	if scope.include_plan_summary {
		attachments.push(Attachment {
			kind: AttachmentKind::PlanSummary,
			label: "Liquidation_Plan_Steps.txt".to_string(),
			required: false,
		});
	}

	attachments
}

fn validate_request(req: &ComposeRequest) -> Result<()> {
	if req.schema_version != SCHEMA_VERSION {
		return Err(Error::InvalidRequest {
			message: format!("Unsupported schemaVersion {}.", req.schema_version),
		});
	}
	if req.item_id.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "itemId is required.".to_string() });
	}
	if req.item_summary.title.trim().is_empty() {
		return Err(Error::InvalidRequest {
			message: "itemSummary.title is required.".to_string(),
		});
	}
	if req.partner.name.trim().is_empty() || req.partner.partner_type.trim().is_empty() {
		return Err(Error::InvalidRequest {
			message: "partner.name and partner.partnerType are required.".to_string(),
		});
	}
	if req.location.city.trim().is_empty() || req.location.region.trim().is_empty() {
		return Err(Error::InvalidRequest {
			message: "location.city and location.region are required.".to_string(),
		});
	}

	Ok(())
}

fn default_schema_version() -> u32 {
	SCHEMA_VERSION
}

fn default_scope() -> String {
	"item".to_string()
}

fn default_currency_code() -> String {
	"USD".to_string()
}
