mod common;

use anyhow::Result;
use common::test_service;
use outlay::application::AppError;

#[tokio::test]
async fn test_create_and_list_owners() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let zoe = service.create_owner("zoe").await?;
    let ann = service.create_owner("  ann  ").await?;
    assert_eq!(ann.name, "ann");

    let owners = service.list_owners().await?;
    let names: Vec<_> = owners.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["ann", "zoe"]);

    assert_eq!(service.get_owner("zoe").await?.id, zoe.id);
    assert_eq!(service.get_owner(" ann ").await?.id, ann.id);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_owner_name() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.create_owner("alice").await?;

    let result = service.create_owner("alice ").await;
    assert!(matches!(result, Err(AppError::OwnerAlreadyExists(_))));
    assert_eq!(service.list_owners().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_owner_name_too_short() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for name in ["", "ab", "  x  "] {
        let result = service.create_owner(name).await;
        assert!(matches!(result, Err(AppError::InvalidOwnerName(_))));
    }
    assert!(service.list_owners().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_owner() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.get_owner("nobody").await;
    assert!(matches!(result, Err(AppError::OwnerNotFound(_))));
    Ok(())
}
