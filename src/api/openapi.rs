//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, deliveries, health, payments, supplier_requests};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rentiva API",
        version = "1.0.0",
        description = "Equipment Rental Marketplace REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Rentiva Team", email = "dev@rentiva.io")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Bookings
        bookings::create_booking,
        bookings::get_booking,
        bookings::update_booking,
        bookings::cancel_booking,
        // Payments
        payments::get_charge_amount,
        payments::payment_confirmed,
        payments::get_settlement_amount,
        // Deliveries
        deliveries::assign_delivery,
        deliveries::get_delivery,
        deliveries::update_delivery_status,
        deliveries::report_location,
        deliveries::get_location,
        // Recollection
        deliveries::assign_recollect,
        deliveries::update_recollect_status,
        deliveries::submit_recollect_report,
        // Supplier requests
        supplier_requests::create_request,
        supplier_requests::get_request,
        supplier_requests::set_request_status,
        supplier_requests::set_fulfillment_status,
    ),
    components(
        schemas(
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingItem,
            crate::models::booking::ItemRequest,
            crate::models::booking::CreateBooking,
            crate::models::booking::UpdateBooking,
            crate::models::booking::CancelBooking,
            crate::models::enums::BookingStatus,
            // Payments
            crate::services::bookings::ChargeAmounts,
            crate::services::recollection::SettlementAmounts,
            crate::services::recollection::ReportOutcome,
            // Deliveries
            crate::models::delivery::Delivery,
            crate::models::delivery::GeoPoint,
            crate::models::delivery::AssignDelivery,
            crate::models::delivery::UpdateDeliveryStatus,
            crate::models::delivery::ReportLocation,
            crate::models::delivery::AssignRecollect,
            crate::models::delivery::UpdateRecollectStatus,
            crate::models::delivery::SubmitRecollectReport,
            crate::models::delivery::RecollectReport,
            crate::models::delivery::ReportItem,
            crate::models::delivery::ItemCondition,
            crate::models::enums::DeliveryStatus,
            crate::models::enums::RecollectStatus,
            deliveries::LocationResponse,
            // Supplier requests
            crate::models::supplier_request::SupplierRequest,
            crate::models::supplier_request::RequestItem,
            crate::models::supplier_request::RequestItemRequest,
            crate::models::supplier_request::CreateSupplierRequest,
            crate::models::supplier_request::SetRequestStatus,
            crate::models::supplier_request::SetFulfillmentStatus,
            crate::models::enums::RequestStatus,
            crate::models::enums::FulfillmentStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "bookings", description = "Booking lifecycle"),
        (name = "payments", description = "Payment-settlement seam"),
        (name = "deliveries", description = "Outbound fulfillment"),
        (name = "recollection", description = "Return leg and settlement"),
        (name = "supplier-requests", description = "Direct supplier requests")
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated document
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
