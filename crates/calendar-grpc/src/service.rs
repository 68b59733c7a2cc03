//! `event.EventService` handlers backed by the [`Calendar`] facade.

use std::time::Duration;

use async_trait::async_trait;
use calendar_core::{Calendar, Context};
use tonic::{Request, Response, Status};

use crate::convert::{event_from_proto, event_to_proto, required_timestamp};
use crate::error::status_from_storage;
use crate::pb::event_service_server::EventService;
use crate::pb::{
    CreateEventRequest, DeleteEventRequest, EventResponse, EventsResponse, ListDayRequest,
    ListMonthRequest, ListWeekRequest, UpdateEventRequest,
};

/// gRPC front of the scheduling core.
#[derive(Clone)]
pub struct CalendarGrpcService {
    calendar: Calendar,
    request_timeout: Duration,
}

impl CalendarGrpcService {
    /// Serve `calendar`, bounding each call's storage work by `request_timeout`.
    pub const fn new(calendar: Calendar, request_timeout: Duration) -> Self {
        Self {
            calendar,
            request_timeout,
        }
    }

    fn context(&self) -> Context {
        Context::background().with_timeout(self.request_timeout)
    }
}

fn required_user(user_id: &str) -> Result<&str, Status> {
    if user_id.is_empty() {
        return Err(Status::invalid_argument("user_id is required"));
    }
    Ok(user_id)
}

fn events_response(events: Vec<calendar_core::Event>) -> Response<EventsResponse> {
    Response::new(EventsResponse {
        events: events.into_iter().map(event_to_proto).collect(),
    })
}

#[async_trait]
impl EventService for CalendarGrpcService {
    async fn create_event(
        &self,
        request: Request<CreateEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let event = request
            .into_inner()
            .event
            .ok_or_else(|| Status::invalid_argument("event is required"))?;
        let event = event_from_proto(event)?;

        self.calendar
            .create_full_event(&self.context(), event.clone())
            .await
            .map_err(status_from_storage)?;

        Ok(Response::new(EventResponse {
            event: Some(event_to_proto(event)),
        }))
    }

    async fn update_event(
        &self,
        request: Request<UpdateEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let event = request
            .into_inner()
            .event
            .ok_or_else(|| Status::invalid_argument("event is required"))?;
        let event = event_from_proto(event)?;

        self.calendar
            .update_event(&self.context(), event.clone())
            .await
            .map_err(status_from_storage)?;

        Ok(Response::new(EventResponse {
            event: Some(event_to_proto(event)),
        }))
    }

    async fn delete_event(
        &self,
        request: Request<DeleteEventRequest>,
    ) -> Result<Response<()>, Status> {
        let id = request.into_inner().id;
        if id.is_empty() {
            return Err(Status::invalid_argument("id is required"));
        }

        self.calendar
            .delete_event(&self.context(), &id)
            .await
            .map_err(status_from_storage)?;

        Ok(Response::new(()))
    }

    async fn list_day(
        &self,
        request: Request<ListDayRequest>,
    ) -> Result<Response<EventsResponse>, Status> {
        let request = request.into_inner();
        let user_id = required_user(&request.user_id)?;
        let date = required_timestamp(request.date, "date")?;

        let events = self
            .calendar
            .list_day(&self.context(), user_id, date)
            .await
            .map_err(status_from_storage)?;
        Ok(events_response(events))
    }

    async fn list_week(
        &self,
        request: Request<ListWeekRequest>,
    ) -> Result<Response<EventsResponse>, Status> {
        let request = request.into_inner();
        let user_id = required_user(&request.user_id)?;
        let week_start = required_timestamp(request.week_start, "week_start")?;

        let events = self
            .calendar
            .list_week(&self.context(), user_id, week_start)
            .await
            .map_err(status_from_storage)?;
        Ok(events_response(events))
    }

    async fn list_month(
        &self,
        request: Request<ListMonthRequest>,
    ) -> Result<Response<EventsResponse>, Status> {
        let request = request.into_inner();
        let user_id = required_user(&request.user_id)?;
        let month_start = required_timestamp(request.month_start, "month_start")?;

        let events = self
            .calendar
            .list_month(&self.context(), user_id, month_start)
            .await
            .map_err(status_from_storage)?;
        Ok(events_response(events))
    }
}
