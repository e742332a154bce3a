use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;

pub mod auth;
pub mod contact;
pub mod email;
pub mod types;

/// Clients for the hosted services, built once at cold start and shared
/// across invocations.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub s3_client: S3Client,
    pub cognito_client: CognitoClient,
    pub ses_client: SesClient,
}

impl AppState {
    pub async fn load() -> Self {
        let config = aws_config::load_from_env().await;
        Self {
            dynamo_client: DynamoClient::new(&config),
            s3_client: S3Client::new(&config),
            cognito_client: CognitoClient::new(&config),
            ses_client: SesClient::new(&config),
        }
    }
}
