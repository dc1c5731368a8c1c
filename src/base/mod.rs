// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod authenticator;
mod base_service;
mod detailed_response;
mod gzip;
mod request_builder;
mod retry;

pub use authenticator::{
    authenticator_from_config, Authenticator, BasicAuthenticator, BearerTokenAuthenticator,
    NoAuthAuthenticator, API_KEY_USERNAME,
};
pub use base_service::{BaseService, CORRELATION_ID_HEADER, DEFAULT_USER_AGENT};
pub use detailed_response::{DetailedResponse, NoContent};
pub use gzip::gzip_body;
pub use request_builder::{PreparedRequest, RequestBuilder, JSON_MEDIA_TYPE};
pub use retry::{retry_after, RetryPolicy};
