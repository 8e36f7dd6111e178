use crate::models::product::Product;
use mediator_pipeline::Notification;

#[derive(Debug, Clone)]
pub struct Broadcast(pub String);
impl Notification for Broadcast {}

#[derive(Debug, Clone)]
pub struct ProductCreatedEvent(pub Product);
impl Notification for ProductCreatedEvent {}
